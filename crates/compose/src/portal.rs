use crate::builtin::PORTAL_PATH;
use crate::composer::{ComposeError, SceneComposer};
use crate::config::DemoConfig;
use crate::rng::SplitMix64;
use glam::Vec3;
use lumen_assets::AssetLoader;
use lumen_common::{Color, LayerMask, NodeId};
use lumen_render::{PerspectiveCamera, RenderSettings, ToneMapping};
use lumen_scene::{Material, NodeKind, SceneError, SceneGraph, SceneNode, UniformValue, Uniforms};

const MAX_PIXEL_RATIO: f32 = 2.0;

/// Handles to the nodes the portal scene animates or exposes for tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalNodes {
    pub root: NodeId,
    pub portal_light: NodeId,
    pub pole_light_a: NodeId,
    pub pole_light_b: NodeId,
    pub fireflies: NodeId,
}

/// Imported portal model with baked, pole and portal materials plus fireflies.
#[derive(Debug, Clone)]
pub struct PortalScene {
    clear_color: Color,
    color_start: Color,
    color_end: Color,
    fireflies_size: f32,
    fireflies_count: usize,
    seed: u64,
    pixel_ratio: f32,
    nodes: Option<PortalNodes>,
}

impl PortalScene {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            clear_color: config.clear_color,
            color_start: config.portal_color_start,
            color_end: config.portal_color_end,
            fireflies_size: config.fireflies_size,
            fireflies_count: config.fireflies_count,
            seed: config.seed,
            pixel_ratio: config.viewport.device_pixel_ratio.min(MAX_PIXEL_RATIO),
            nodes: None,
        }
    }

    pub fn nodes(&self) -> Option<PortalNodes> {
        self.nodes
    }

    fn baked_material() -> Material {
        Material::basic(Color::from_hex(0x7a6a58))
    }

    fn pole_light_material() -> Material {
        Material::basic(Color::from_hex(0xffffe5))
    }

    fn portal_light_material(&self) -> Material {
        Material::Shader {
            uniforms: Uniforms::from([
                ("uTime".to_string(), UniformValue::Float(0.0)),
                ("uColorStart".to_string(), UniformValue::Color(self.color_start)),
                ("uColorEnd".to_string(), UniformValue::Color(self.color_end)),
            ]),
            transparent: false,
            additive: false,
        }
    }

    fn fireflies(&self) -> SceneNode {
        let mut rng = SplitMix64::new(self.seed);
        let mut positions = Vec::with_capacity(self.fireflies_count);
        let mut scales = Vec::with_capacity(self.fireflies_count);
        for _ in 0..self.fireflies_count {
            scales.push(rng.next_f32());
            let x = (rng.next_f32() - 0.5) * 4.0;
            let y = rng.next_f32() * 1.5;
            let z = (rng.next_f32() - 0.5) * 4.0;
            positions.push(Vec3::new(x, y, z));
        }
        let material = Material::Shader {
            uniforms: Uniforms::from([
                ("uPixelRatio".to_string(), UniformValue::Float(self.pixel_ratio)),
                ("uSize".to_string(), UniformValue::Float(self.fireflies_size)),
                ("uTime".to_string(), UniformValue::Float(0.0)),
            ]),
            transparent: true,
            additive: true,
        };
        SceneNode::new(
            "fireflies",
            NodeKind::Points {
                positions,
                scales,
                material,
            },
        )
    }
}

impl SceneComposer for PortalScene {
    fn name(&self) -> &'static str {
        "portal"
    }

    fn build_scene(&mut self, loader: &mut dyn AssetLoader) -> Result<SceneGraph, ComposeError> {
        let mut scene = SceneGraph::new();
        let model = loader.load_model(PORTAL_PATH)?;
        let root = model.instantiate(&mut scene, None, LayerMask::default())?;

        // Resolve every required node before touching materials.
        let portal_light = scene.find_in_subtree(root, "portalLight")?;
        let pole_light_a = scene.find_in_subtree(root, "poleLightA")?;
        let pole_light_b = scene.find_in_subtree(root, "poleLightB")?;

        for id in scene.descendants(root) {
            if scene.get(id).is_some_and(|n| n.kind.material().is_some()) {
                scene.set_material(id, Self::baked_material())?;
            }
        }
        scene.set_material(portal_light, self.portal_light_material())?;
        scene.set_material(pole_light_a, Self::pole_light_material())?;
        scene.set_material(pole_light_b, Self::pole_light_material())?;

        let fireflies = scene.add(self.fireflies());

        self.nodes = Some(PortalNodes {
            root,
            portal_light,
            pole_light_a,
            pole_light_b,
            fireflies,
        });
        tracing::info!(
            nodes = scene.node_count(),
            fireflies = self.fireflies_count,
            "portal scene built"
        );
        Ok(scene)
    }

    fn advance(&self, scene: &mut SceneGraph, elapsed: f32) -> Result<(), SceneError> {
        let Some(nodes) = self.nodes else {
            return Ok(());
        };
        scene.set_uniform(nodes.fireflies, "uTime", UniformValue::Float(elapsed))?;
        scene.set_uniform(nodes.portal_light, "uTime", UniformValue::Float(elapsed))
    }

    fn main_camera(&self, aspect: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(45.0, aspect, 0.1, 100.0);
        camera.position = Vec3::new(4.0, 2.0, 4.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn reflective_node(&self) -> Option<NodeId> {
        None
    }

    fn configure(&self, settings: &mut RenderSettings) {
        settings.clear_color = self.clear_color;
        settings.tone_mapping = ToneMapping::None;
    }

    fn set_pixel_ratio(&self, scene: &mut SceneGraph, ratio: f32) -> Result<(), SceneError> {
        let Some(nodes) = self.nodes else {
            return Ok(());
        };
        scene.set_uniform(
            nodes.fireflies,
            "uPixelRatio",
            UniformValue::Float(ratio.min(MAX_PIXEL_RATIO)),
        )
    }
}
