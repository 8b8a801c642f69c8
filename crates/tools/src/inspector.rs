use lumen_common::{LayerMask, NodeId};
use lumen_scene::{Background, Environment, NodeKind, SceneGraph};

/// Scene inspector for developer tooling.
///
/// Read-only queries against a scene graph for logs, the CLI and tests.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &SceneGraph) -> SceneSummary {
        let (meshes, points, lights, groups) = scene.kind_counts();
        SceneSummary {
            revision: scene.revision(),
            nodes: scene.node_count(),
            meshes,
            points,
            lights,
            groups,
            background: match scene.background() {
                None => "clear color",
                Some(Background::Color(_)) => "color",
                Some(Background::Sky(_)) => "sky",
            },
            environment: match scene.environment() {
                None => "none".to_string(),
                Some(Environment::Sky(_)) => "sky".to_string(),
                Some(Environment::Cube(texture)) => format!("cube #{}", texture.0),
            },
            state_hash: scene.state_hash(),
        }
    }

    pub fn inspect_node(scene: &SceneGraph, id: NodeId) -> Option<NodeInfo> {
        let node = scene.get(id)?;
        Some(NodeInfo {
            id,
            name: node.name.clone(),
            kind: match node.kind {
                NodeKind::Group => "group",
                NodeKind::Mesh { .. } => "mesh",
                NodeKind::Points { .. } => "points",
                NodeKind::Light(_) => "light",
            },
            world_position: scene.world_position(id)?.to_array(),
            layers: node.layers,
            visible: scene.is_effectively_visible(id),
        })
    }

    /// All nodes in build order, depth-first from each root.
    pub fn list_nodes(scene: &SceneGraph) -> Vec<NodeId> {
        scene.roots().iter().flat_map(|root| scene.descendants(*root)).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub revision: u64,
    pub nodes: usize,
    pub meshes: usize,
    pub points: usize,
    pub lights: usize,
    pub groups: usize,
    pub background: &'static str,
    pub environment: String,
    pub state_hash: u64,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: rev={} nodes={} (meshes={} points={} lights={} groups={}) background={} environment={} hash={:016x}",
            self.revision,
            self.nodes,
            self.meshes,
            self.points,
            self.lights,
            self.groups,
            self.background,
            self.environment,
            self.state_hash
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub world_position: [f32; 3],
    pub layers: LayerMask,
    pub visible: bool,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {:?} pos=({:.2}, {:.2}, {:.2}) layers={:#x}{}",
            self.id.short(),
            self.kind,
            self.name,
            self.world_position[0],
            self.world_position[1],
            self.world_position[2],
            self.layers.bits(),
            if self.visible { "" } else { " hidden" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_common::{Color, Layer, Transform};
    use lumen_scene::{Geometry, Material, SceneNode, TextureId};

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&SceneGraph::new());
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.background, "clear color");
        assert_eq!(summary.environment, "none");
    }

    #[test]
    fn summary_counts_kinds() {
        let mut scene = SceneGraph::new();
        let group = scene.add(SceneNode::group("rig"));
        scene
            .add_child(
                group,
                SceneNode::mesh("ball", Geometry::Sphere { radius: 1.0 }, Material::default()),
            )
            .unwrap();
        scene.set_background(Some(Background::Color(Color::BLACK)));
        scene.set_environment(Some(Environment::Cube(TextureId(3))));
        let summary = SceneInspector::summary(&scene);
        assert_eq!((summary.meshes, summary.groups, summary.lights), (1, 1, 0));
        assert_eq!(summary.environment, "cube #3");
        assert!(summary.to_string().contains("nodes=2"));
    }

    #[test]
    fn inspect_node_reports_world_position() {
        let mut scene = SceneGraph::new();
        let parent = scene.add(SceneNode::group("rig").with_transform(Transform::from_position(Vec3::Y)));
        let child = scene
            .add_child(
                parent,
                SceneNode::mesh("donut", Geometry::Torus { radius: 8.0, tube: 0.5 }, Material::default())
                    .with_transform(Transform::from_position(Vec3::X))
                    .with_layers(LayerMask::only(Layer::REFLECTIVE)),
            )
            .unwrap();
        let info = SceneInspector::inspect_node(&scene, child).unwrap();
        assert_eq!(info.world_position, [1.0, 1.0, 0.0]);
        assert_eq!(info.kind, "mesh");
        assert!(info.to_string().contains("layers=0x2"));
        assert!(SceneInspector::inspect_node(&scene, NodeId::new()).is_none());
    }

    #[test]
    fn list_nodes_in_build_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add(SceneNode::group("a"));
        let a1 = scene.add_child(a, SceneNode::group("a1")).unwrap();
        let b = scene.add(SceneNode::group("b"));
        assert_eq!(SceneInspector::list_nodes(&scene), vec![a, a1, b]);
    }
}
