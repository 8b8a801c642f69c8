use glam::{Mat4, Vec3};
use lumen_common::LayerMask;

/// Perspective camera with a look direction and a layer mask.
///
/// Only nodes whose layers intersect `layers` are drawn through this camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    forward: Vec3,
    up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub layers: LayerMask,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_degrees: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            layers: LayerMask::ALL,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize()
    }

    /// Point the camera at `target`, keeping world +Y as up.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() > f32::EPSILON {
            self.orient(dir, Vec3::Y);
        }
    }

    /// Set look direction and up vector explicitly (used by cube faces).
    pub fn orient(&mut self, forward: Vec3, up: Vec3) {
        self.forward = forward.normalize();
        // Re-orthogonalize so `up` is exactly perpendicular to `forward`.
        let right = self.forward.cross(up).normalize();
        self.up = right.cross(self.forward).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray direction through normalized device coords in `-1..=1`.
    pub fn ray_direction(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let half_h = (self.fov_degrees.to_radians() * 0.5).tan();
        let half_w = half_h * self.aspect;
        (self.forward + self.right() * (ndc_x * half_w) + self.up * (ndc_y * half_h)).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
        assert_eq!(cam.layers, LayerMask::ALL);
    }

    #[test]
    fn look_at_points_forward() {
        let mut cam = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 100.0);
        cam.position = Vec3::new(4.0, 5.0, 4.0);
        cam.look_at(Vec3::new(0.0, 3.5, 0.0));
        let expected = (Vec3::new(0.0, 3.5, 0.0) - cam.position).normalize();
        assert!((cam.forward() - expected).length() < 1e-5);
        assert!(cam.up().dot(cam.forward()).abs() < 1e-5);
    }

    #[test]
    fn centre_ray_is_forward() {
        let mut cam = PerspectiveCamera::default();
        cam.orient(Vec3::X, Vec3::NEG_Y);
        assert!((cam.ray_direction(0.0, 0.0) - Vec3::X).length() < 1e-6);
        assert!((cam.right() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn look_at_self_is_ignored() {
        let mut cam = PerspectiveCamera::default();
        cam.look_at(cam.position);
        assert_eq!(cam.forward(), Vec3::NEG_Z);
    }
}
