use crate::camera::PerspectiveCamera;
use crate::target::Framebuffer;
use lumen_common::NodeId;
use lumen_scene::{NodeKind, SceneGraph};
use std::fmt::Write;

/// Human-readable dumps of scene and framebuffer state.
///
/// Used for CLI output, logging, and tests that want to eyeball a capture.
#[derive(Debug, Default)]
pub struct TextReport;

impl TextReport {
    pub fn new() -> Self {
        Self
    }

    /// What `camera` would draw: its pose and every node its layers admit.
    pub fn scene(&self, scene: &SceneGraph, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (revision={}, nodes={}) ===",
            scene.revision(),
            scene.node_count()
        );
        let (p, f) = (camera.position, camera.forward());
        let _ = writeln!(
            out,
            "Camera: pos=({:.1}, {:.1}, {:.1}) dir=({:.2}, {:.2}, {:.2}) fov={:.0} layers={:#x}",
            p.x,
            p.y,
            p.z,
            f.x,
            f.y,
            f.z,
            camera.fov_degrees,
            camera.layers.bits()
        );
        for (id, node) in scene.visible_to(camera.layers) {
            let kind = match &node.kind {
                NodeKind::Group => "group",
                NodeKind::Mesh { .. } => "mesh",
                NodeKind::Points { .. } => "points",
                NodeKind::Light(_) => "light",
            };
            let pos = scene.world_position(id).unwrap_or_default();
            let _ = writeln!(
                out,
                "  [{}] {:<6} {:<16} pos=({:.2}, {:.2}, {:.2})",
                id.short(),
                kind,
                node.name,
                pos.x,
                pos.y,
                pos.z
            );
        }
        out
    }

    /// ASCII coverage map: `#` where `highlight` was drawn, `+` for other
    /// geometry, `.` for background.
    pub fn coverage(&self, fb: &Framebuffer, highlight: Option<NodeId>) -> String {
        let mut out = String::with_capacity(((fb.width() + 1) * fb.height()) as usize);
        for row in fb.pixels().chunks(fb.width().max(1) as usize) {
            for pixel in row {
                out.push(match pixel.node {
                    None => '.',
                    Some(n) if Some(n) == highlight => '#',
                    Some(_) => '+',
                });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Renderer;
    use crate::software::SoftwareRenderer;
    use glam::Vec3;
    use lumen_common::{Color, Layer, LayerMask};
    use lumen_scene::{Geometry, Material, SceneNode};

    #[test]
    fn empty_scene_report() {
        let out = TextReport::new().scene(&SceneGraph::new(), &PerspectiveCamera::default());
        assert!(out.contains("revision=0"));
        assert!(out.contains("nodes=0"));
        assert!(out.contains("fov=75"));
    }

    #[test]
    fn report_respects_camera_layers() {
        let mut scene = SceneGraph::new();
        scene.add(SceneNode::group("rig"));
        scene.add(
            SceneNode::mesh("mirror", Geometry::Sphere { radius: 1.0 }, Material::default())
                .with_layers(LayerMask::only(Layer::REFLECTIVE)),
        );
        let mut cam = PerspectiveCamera::default();
        assert!(TextReport::new().scene(&scene, &cam).contains("mirror"));
        cam.layers = LayerMask::ALL.without(Layer::REFLECTIVE);
        let out = TextReport::new().scene(&scene, &cam);
        assert!(!out.contains("mirror"));
        assert!(out.contains("rig"));
    }

    #[test]
    fn coverage_map_marks_highlight() {
        let mut scene = SceneGraph::new();
        let ball = scene.add(SceneNode::mesh(
            "ball",
            Geometry::Sphere { radius: 1.0 },
            Material::basic(Color::WHITE),
        ));
        let mut cam = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        cam.position = Vec3::new(0.0, 0.0, 5.0);
        cam.look_at(Vec3::ZERO);
        let mut r = SoftwareRenderer::new(5, 5);
        r.render(&scene, &cam).unwrap();
        let map = TextReport::new().coverage(r.surface(), Some(ball));
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2].chars().nth(2), Some('#'));
        assert_eq!(lines[0].chars().next(), Some('.'));
    }
}
