use glam::Vec3;
use lumen_common::{Layer, LayerMask};
use lumen_render::{CubeFace, PerspectiveCamera};

/// Six 90°, aspect-1 cameras sharing one position, one per cube face.
#[derive(Debug, Clone)]
pub struct CubeCamera {
    position: Vec3,
    near: f32,
    far: f32,
    layers: LayerMask,
}

impl CubeCamera {
    pub const FOV_DEGREES: f32 = 90.0;

    /// `layers` is what the capture may see; the reflective layer is always
    /// stripped from it.
    pub fn new(near: f32, far: f32, layers: LayerMask) -> Self {
        Self {
            position: Vec3::ZERO,
            near,
            far,
            layers: layers.without(Layer::REFLECTIVE),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn capture_layers(&self) -> LayerMask {
        self.layers
    }

    /// Narrow or widen what the capture sees; `Layer::REFLECTIVE` stays excluded.
    pub fn set_capture_layers(&mut self, layers: LayerMask) {
        self.layers = layers.without(Layer::REFLECTIVE);
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Camera that renders `face`.
    pub fn face_camera(&self, face: CubeFace) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(Self::FOV_DEGREES, 1.0, self.near, self.far);
        cam.position = self.position;
        cam.orient(face.forward(), face.up());
        cam.layers = self.layers;
        cam
    }
}

impl Default for CubeCamera {
    fn default() -> Self {
        Self::new(0.1, 100.0, LayerMask::only(Layer::DEFAULT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflective_layer_is_stripped() {
        let cam = CubeCamera::new(0.1, 100.0, LayerMask::ALL);
        assert!(!cam.capture_layers().contains(Layer::REFLECTIVE));
        assert!(cam.capture_layers().contains(Layer::DEFAULT));

        let mut cam = CubeCamera::default();
        cam.set_capture_layers(LayerMask::only(Layer::REFLECTIVE));
        assert!(cam.capture_layers().is_empty());
    }

    #[test]
    fn face_cameras_cover_the_cube() {
        let mut cam = CubeCamera::default();
        cam.set_position(Vec3::new(0.0, 3.5, 0.0));
        for face in CubeFace::ALL {
            let fc = cam.face_camera(face);
            assert_eq!(fc.position, Vec3::new(0.0, 3.5, 0.0));
            assert_eq!(fc.fov_degrees, 90.0);
            assert_eq!(fc.aspect, 1.0);
            assert!((fc.forward() - face.forward()).length() < 1e-6);
            assert!(!fc.layers.contains(Layer::REFLECTIVE));
        }
    }
}
