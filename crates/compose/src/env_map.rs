use crate::builtin::{ENVIRONMENT_PATH, HELMET_PATH};
use crate::composer::{ComposeError, SceneComposer};
use crate::config::DemoConfig;
use glam::{Quat, Vec3};
use lumen_assets::AssetLoader;
use lumen_common::{Color, Layer, LayerMask, NodeId, Transform};
use lumen_render::{PerspectiveCamera, RenderSettings, ToneMapping};
use lumen_scene::{Geometry, Light, LightKind, Material, SceneError, SceneGraph, SceneNode};

const DONUT_HEIGHT: f32 = 3.5;
/// Peak tilt of the donut, in radians.
const DONUT_SWING: f32 = 2.0;
const HELMET_SCALE: f32 = 10.0;

/// Tilt of the reflective donut about X at `elapsed` seconds.
pub fn donut_tilt(elapsed: f32) -> f32 {
    elapsed.sin() * DONUT_SWING
}

#[derive(Debug, Clone, Copy)]
struct Nodes {
    donut: NodeId,
    knot: NodeId,
    helmet: Option<NodeId>,
}

/// The "holy donut": a mirror torus reflecting a live capture of the room.
#[derive(Debug, Clone)]
pub struct EnvironmentMapScene {
    load_helmet: bool,
    tone_mapping: ToneMapping,
    exposure: f32,
    nodes: Option<Nodes>,
}

impl EnvironmentMapScene {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            load_helmet: config.helmet,
            tone_mapping: config.tone_mapping,
            exposure: config.tone_mapping_exposure,
            nodes: None,
        }
    }

    pub fn donut(&self) -> Option<NodeId> {
        self.nodes.map(|n| n.donut)
    }

    pub fn knot(&self) -> Option<NodeId> {
        self.nodes.map(|n| n.knot)
    }

    pub fn helmet(&self) -> Option<NodeId> {
        self.nodes.and_then(|n| n.helmet)
    }

    fn add_helmet(
        &self,
        scene: &mut SceneGraph,
        loader: &mut dyn AssetLoader,
    ) -> Result<Option<NodeId>, ComposeError> {
        if !self.load_helmet {
            return Ok(None);
        }
        let model = match loader.load_model(HELMET_PATH) {
            Ok(model) => model,
            Err(err) => {
                tracing::warn!(path = HELMET_PATH, error = %err, "helmet unavailable, continuing without it");
                return Ok(None);
            }
        };
        let root = model.instantiate(scene, None, LayerMask::default())?;
        let mut transform = scene.get(root).ok_or(SceneError::UnknownNode(root))?.transform;
        transform.scale = Vec3::splat(HELMET_SCALE);
        scene.set_transform(root, transform)?;
        Ok(Some(root))
    }
}

impl SceneComposer for EnvironmentMapScene {
    fn name(&self) -> &'static str {
        "environment_map"
    }

    fn build_scene(&mut self, loader: &mut dyn AssetLoader) -> Result<SceneGraph, ComposeError> {
        let mut scene = SceneGraph::new();
        let room = loader.load_environment(ENVIRONMENT_PATH)?;
        // Static fallback until a capture publishes its cube.
        room.apply(&mut scene);

        let helmet = self.add_helmet(&mut scene, loader)?;

        let donut = scene.add(
            SceneNode::mesh(
                "holyDonut",
                Geometry::Torus {
                    radius: 8.0,
                    tube: 0.5,
                },
                Material::standard(Color::from_hex(0xaaaaaa), 0.0, 1.0),
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, DONUT_HEIGHT, 0.0)))
            .with_layers(LayerMask::only(Layer::REFLECTIVE)),
        );

        let knot = scene.add(
            SceneNode::mesh(
                "torusKnot",
                Geometry::TorusKnot {
                    radius: 1.0,
                    tube: 0.4,
                },
                Material::standard(Color::from_hex(0xaaaaaa), 0.3, 1.0),
            )
            .with_transform(Transform::from_position(Vec3::new(-4.0, 4.0, 0.0))),
        );

        scene.add(
            SceneNode::light(
                "lamp",
                Light {
                    kind: LightKind::Point { range: 0.0 },
                    color: Color::from_hex(0xfff2dd),
                    intensity: 1.5,
                },
            )
            .with_transform(Transform::from_position(Vec3::new(2.0, 7.0, 3.0))),
        );

        self.nodes = Some(Nodes { donut, knot, helmet });
        tracing::info!(nodes = scene.node_count(), helmet = helmet.is_some(), "environment map scene built");
        Ok(scene)
    }

    fn advance(&self, scene: &mut SceneGraph, elapsed: f32) -> Result<(), SceneError> {
        let Some(nodes) = self.nodes else {
            return Ok(());
        };
        let mut transform = scene.get(nodes.donut).ok_or(SceneError::UnknownNode(nodes.donut))?.transform;
        transform.rotation = Quat::from_rotation_x(donut_tilt(elapsed));
        scene.set_transform(nodes.donut, transform)
    }

    fn main_camera(&self, aspect: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, aspect, 0.1, 100.0);
        camera.position = Vec3::new(4.0, 5.0, 4.0);
        camera.look_at(Vec3::new(0.0, DONUT_HEIGHT, 0.0));
        camera
    }

    fn reflective_node(&self) -> Option<NodeId> {
        self.donut()
    }

    fn configure(&self, settings: &mut RenderSettings) {
        settings.tone_mapping = self.tone_mapping;
        settings.tone_mapping_exposure = self.exposure;
    }
}
