use crate::environment::{Background, Environment};
use crate::node::{Material, NodeKind, SceneNode, UniformValue};
use glam::{Mat4, Vec3};
use lumen_common::{LayerMask, NodeId, Transform};
use std::collections::BTreeMap;

/// Errors from scene graph operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    UnknownNode(NodeId),
    /// An expected named subtree is absent, usually after loading a model.
    #[error("no node named {name:?} in the scene")]
    MissingNamedNode { name: String },
    #[error("node {0:?} has no shader material")]
    NotAShaderMaterial(NodeId),
    #[error("node {node:?} has no uniform {name:?}")]
    MissingUniform { node: NodeId, name: String },
    #[error("uniform {name:?} cannot change type")]
    UniformTypeMismatch { name: String },
    #[error("node {0:?} has no material")]
    NoMaterial(NodeId),
}

/// The retained scene.
///
/// Nodes are stored in a BTreeMap for deterministic iteration. Insertion
/// order of roots is kept separately so reports list nodes the way the scene
/// was built.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    background: Option<Background>,
    environment: Option<Environment>,
    environment_intensity: f32,
    background_intensity: f32,
    /// Bumped on every mutation; consumers use it to detect stale derived data.
    revision: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            background: None,
            environment: None,
            environment_intensity: 1.0,
            background_intensity: 1.0,
            revision: 0,
        }
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Read-only access to all nodes (BTreeMap for deterministic iteration).
    pub fn nodes(&self) -> &BTreeMap<NodeId, SceneNode> {
        &self.nodes
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.revision += 1;
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))
    }

    /// Add a top-level node. Returns its id.
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId::new();
        self.insert(id, None, node);
        self.roots.push(id);
        id
    }

    /// Attach `node` under `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = NodeId::new();
        self.insert(id, Some(parent), node);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    fn insert(&mut self, id: NodeId, parent: Option<NodeId>, mut node: SceneNode) {
        node.parent = parent;
        node.children.clear();
        tracing::trace!(node = %id.short(), name = %node.name, "node added");
        self.nodes.insert(id, node);
        self.revision += 1;
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    pub fn set_layers(&mut self, id: NodeId, layers: LayerMask) -> Result<(), SceneError> {
        self.node_mut(id)?.layers = layers;
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// Replace a drawable's material.
    pub fn set_material(&mut self, id: NodeId, material: Material) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let slot = node.kind.material_mut().ok_or(SceneError::NoMaterial(id))?;
        *slot = material;
        Ok(())
    }

    /// Write an existing shader uniform. The uniform must already exist and
    /// keep its type, as a compiled program's interface is fixed.
    pub fn set_uniform(&mut self, id: NodeId, name: &str, value: UniformValue) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let uniforms = node
            .kind
            .material_mut()
            .and_then(Material::uniforms_mut)
            .ok_or(SceneError::NotAShaderMaterial(id))?;
        let slot = uniforms.get_mut(name).ok_or_else(|| SceneError::MissingUniform {
            node: id,
            name: name.to_string(),
        })?;
        if !slot.same_kind(&value) {
            return Err(SceneError::UniformTypeMismatch {
                name: name.to_string(),
            });
        }
        *slot = value;
        Ok(())
    }

    pub fn uniform(&self, id: NodeId, name: &str) -> Option<UniformValue> {
        self.nodes
            .get(&id)?
            .kind
            .material()?
            .uniforms()?
            .get(name)
            .copied()
    }

    /// `None` lets the renderer's clear color show through.
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
        self.revision += 1;
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, environment: Option<Environment>) {
        self.environment = environment;
        self.revision += 1;
    }

    pub fn environment_intensity(&self) -> f32 {
        self.environment_intensity
    }

    pub fn set_environment_intensity(&mut self, intensity: f32) {
        self.environment_intensity = intensity;
        self.revision += 1;
    }

    pub fn background_intensity(&self) -> f32 {
        self.background_intensity
    }

    pub fn set_background_intensity(&mut self, intensity: f32) {
        self.background_intensity = intensity;
        self.revision += 1;
    }

    /// First node with `name`, searching roots depth-first in build order.
    pub fn find_by_name(&self, name: &str) -> Result<NodeId, SceneError> {
        self.roots
            .iter()
            .find_map(|root| self.search(*root, name))
            .ok_or_else(|| SceneError::MissingNamedNode {
                name: name.to_string(),
            })
    }

    /// Like `find_by_name`, restricted to the subtree under `root` (inclusive).
    pub fn find_in_subtree(&self, root: NodeId, name: &str) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&root) {
            return Err(SceneError::UnknownNode(root));
        }
        self.search(root, name)
            .ok_or_else(|| SceneError::MissingNamedNode {
                name: name.to_string(),
            })
    }

    fn search(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        if node.name == name {
            return Some(id);
        }
        node.children.iter().find_map(|c| self.search(*c, name))
    }

    /// All nodes under `root` including itself, depth-first.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Local-to-world matrix: parent chain times the node's own transform.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.transform_point3(Vec3::ZERO))
    }

    /// Whether the node and all its ancestors are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.nodes.get(&current) {
                Some(node) if node.visible => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Nodes a camera with `camera_layers` would draw.
    pub fn visible_to(&self, camera_layers: LayerMask) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().filter_map(move |(id, node)| {
            (node.layers.intersects(camera_layers) && self.is_effectively_visible(*id)).then_some((*id, node))
        })
    }

    /// Deterministic hash of node transforms, for replay comparisons.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, node) in &self.nodes {
            let t = &node.transform;
            mix(&mut h, id.0.as_bytes());
            for v in t.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in t.rotation.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in t.scale.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            mix(&mut h, &node.layers.bits().to_le_bytes());
            if let Some(uniforms) = node.kind.material().and_then(Material::uniforms) {
                for (name, value) in uniforms {
                    mix(&mut h, name.as_bytes());
                    if let Some(f) = value.as_float() {
                        mix(&mut h, &f.to_le_bytes());
                    }
                }
            }
        }
        h
    }

    /// Count of nodes by kind: (meshes, points, lights, groups).
    pub fn kind_counts(&self) -> (usize, usize, usize, usize) {
        self.nodes.values().fold((0, 0, 0, 0), |(m, p, l, g), node| match node.kind {
            NodeKind::Mesh { .. } => (m + 1, p, l, g),
            NodeKind::Points { .. } => (m, p + 1, l, g),
            NodeKind::Light(_) => (m, p, l + 1, g),
            NodeKind::Group => (m, p, l, g + 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Geometry, Uniforms};
    use glam::Quat;
    use lumen_common::{Color, Layer};

    fn torus() -> SceneNode {
        SceneNode::mesh(
            "donut",
            Geometry::Torus {
                radius: 8.0,
                tube: 0.5,
            },
            Material::standard(Color::from_hex(0xaaaaaa), 0.0, 1.0),
        )
    }

    fn fireflies() -> SceneNode {
        SceneNode::new(
            "fireflies",
            NodeKind::Points {
                positions: vec![Vec3::ZERO],
                scales: vec![1.0],
                material: Material::Shader {
                    uniforms: Uniforms::from([("uSize".to_string(), UniformValue::Float(150.0))]),
                    transparent: true,
                    additive: true,
                },
            },
        )
    }

    #[test]
    fn graph_starts_empty() {
        let g = SceneGraph::new();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.revision(), 0);
        assert!(g.environment().is_none());
    }

    #[test]
    fn add_child_composes_world_transform() {
        let mut g = SceneGraph::new();
        let root = g.add(SceneNode::group("model").with_transform(Transform::default().with_scale(Vec3::splat(10.0))));
        let child = g
            .add_child(
                root,
                SceneNode::group("visor").with_transform(Transform::from_position(Vec3::new(0.0, 0.5, 0.0))),
            )
            .unwrap();
        let p = g.world_position(child).unwrap();
        assert!((p - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-5);
        assert_eq!(g.get(child).unwrap().parent(), Some(root));
        assert_eq!(g.get(root).unwrap().children(), &[child]);
    }

    #[test]
    fn add_child_unknown_parent() {
        let mut g = SceneGraph::new();
        let bogus = NodeId::new();
        assert_eq!(
            g.add_child(bogus, SceneNode::group("x")),
            Err(SceneError::UnknownNode(bogus))
        );
    }

    #[test]
    fn find_by_name_reports_missing() {
        let mut g = SceneGraph::new();
        let root = g.add(SceneNode::group("Portal"));
        let light = g.add_child(root, SceneNode::group("portalLight")).unwrap();
        assert_eq!(g.find_by_name("portalLight"), Ok(light));
        assert_eq!(g.find_in_subtree(root, "portalLight"), Ok(light));
        assert_eq!(
            g.find_by_name("poleLightA"),
            Err(SceneError::MissingNamedNode {
                name: "poleLightA".into()
            })
        );
    }

    #[test]
    fn mutations_bump_revision() {
        let mut g = SceneGraph::new();
        let id = g.add(torus());
        let before = g.revision();
        g.set_transform(id, Transform::default().with_rotation(Quat::from_rotation_x(0.5)))
            .unwrap();
        assert!(g.revision() > before);
    }

    #[test]
    fn layer_filtering() {
        let mut g = SceneGraph::new();
        g.add(torus().with_layers(LayerMask::only(Layer::REFLECTIVE)));
        let other = g.add(SceneNode::mesh(
            "knot",
            Geometry::TorusKnot {
                radius: 1.0,
                tube: 0.4,
            },
            Material::default(),
        ));
        let capture_mask = LayerMask::ALL.without(Layer::REFLECTIVE);
        let seen: Vec<NodeId> = g.visible_to(capture_mask).map(|(id, _)| id).collect();
        assert_eq!(seen, vec![other]);
        assert_eq!(g.visible_to(LayerMask::ALL).count(), 2);
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut g = SceneGraph::new();
        let root = g.add(SceneNode::group("root"));
        let child = g.add_child(root, torus()).unwrap();
        g.set_visible(root, false).unwrap();
        assert!(!g.is_effectively_visible(child));
    }

    #[test]
    fn set_uniform_checks_name_and_type() {
        let mut g = SceneGraph::new();
        let id = g.add(fireflies());
        g.set_uniform(id, "uSize", UniformValue::Float(300.0)).unwrap();
        assert_eq!(g.uniform(id, "uSize"), Some(UniformValue::Float(300.0)));
        assert!(matches!(
            g.set_uniform(id, "uNope", UniformValue::Float(1.0)),
            Err(SceneError::MissingUniform { .. })
        ));
        assert!(matches!(
            g.set_uniform(id, "uSize", UniformValue::Color(Color::WHITE)),
            Err(SceneError::UniformTypeMismatch { .. })
        ));
        let donut = g.add(torus());
        assert_eq!(
            g.set_uniform(donut, "uSize", UniformValue::Float(1.0)),
            Err(SceneError::NotAShaderMaterial(donut))
        );
    }

    #[test]
    fn state_hash_tracks_transforms() {
        let mut g = SceneGraph::new();
        let id = g.add(torus());
        let h0 = g.state_hash();
        g.set_transform(id, Transform::from_position(Vec3::X)).unwrap();
        assert_ne!(g.state_hash(), h0);
        g.set_transform(id, Transform::default()).unwrap();
        assert_eq!(g.state_hash(), h0);
    }

    #[test]
    fn descendants_depth_first() {
        let mut g = SceneGraph::new();
        let root = g.add(SceneNode::group("root"));
        let a = g.add_child(root, SceneNode::group("a")).unwrap();
        let a1 = g.add_child(a, SceneNode::group("a1")).unwrap();
        let b = g.add_child(root, SceneNode::group("b")).unwrap();
        assert_eq!(g.descendants(root), vec![root, a, a1, b]);
        assert_eq!(g.kind_counts(), (0, 0, 0, 4));
    }
}
