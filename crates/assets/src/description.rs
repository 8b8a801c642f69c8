use lumen_common::{Color, LayerMask, NodeId, Transform};
use lumen_scene::{
    Background, Environment, Geometry, Light, Material, NodeKind, SceneError, SceneGraph, SceneNode, SkyGradient,
};
use serde::{Deserialize, Serialize};

/// One node of a model file, with its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Falls back to the default standard material when a geometry has none.
    #[serde(default)]
    pub material: Option<Material>,
    #[serde(default)]
    pub light: Option<Light>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            geometry: None,
            material: None,
            light: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Self::group(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }

    fn kind(&self) -> NodeKind {
        match (&self.geometry, &self.light) {
            (Some(geometry), _) => NodeKind::Mesh {
                geometry: *geometry,
                material: self.material.clone().unwrap_or_default(),
            },
            (None, Some(light)) => NodeKind::Light(*light),
            (None, None) => NodeKind::Group,
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// A loadable model: a named node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub root: NodeDescription,
}

impl ModelDescription {
    pub fn new(root: NodeDescription) -> Self {
        Self { root }
    }

    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Add the whole tree to `scene` under `parent` (or as a new root), with
    /// every node on `layers`. Returns the id of the model's root node.
    pub fn instantiate(
        &self,
        scene: &mut SceneGraph,
        parent: Option<NodeId>,
        layers: LayerMask,
    ) -> Result<NodeId, SceneError> {
        let root = add_node(scene, parent, &self.root, layers)?;
        tracing::debug!(model = %self.root.name, nodes = self.node_count(), "model instantiated");
        Ok(root)
    }
}

fn add_node(
    scene: &mut SceneGraph,
    parent: Option<NodeId>,
    desc: &NodeDescription,
    layers: LayerMask,
) -> Result<NodeId, SceneError> {
    let node = SceneNode::new(desc.name.clone(), desc.kind())
        .with_transform(desc.transform)
        .with_layers(layers);
    let id = match parent {
        Some(parent) => scene.add_child(parent, node)?,
        None => scene.add(node),
    };
    for child in &desc.children {
        add_node(scene, Some(id), child, layers)?;
    }
    Ok(id)
}

/// A loadable environment: what surrounds the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentDescription {
    Sky {
        zenith: Color,
        horizon: Color,
        ground: Color,
    },
    Color { color: Color },
}

impl EnvironmentDescription {
    /// Sky gradient equivalent; a flat color is a sky with no gradient.
    pub fn gradient(&self) -> SkyGradient {
        match *self {
            Self::Sky {
                zenith,
                horizon,
                ground,
            } => SkyGradient {
                zenith,
                horizon,
                ground,
            },
            Self::Color { color } => SkyGradient {
                zenith: color,
                horizon: color,
                ground: color,
            },
        }
    }

    pub fn background(&self) -> Background {
        match *self {
            Self::Sky { .. } => Background::Sky(self.gradient()),
            Self::Color { color } => Background::Color(color),
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::Sky(self.gradient())
    }

    /// Install as both the background and the environment of `scene`.
    pub fn apply(&self, scene: &mut SceneGraph) {
        scene.set_background(Some(self.background()));
        scene.set_environment(Some(self.environment()));
    }
}

/// Anything a loader can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
    Model(ModelDescription),
    Environment(EnvironmentDescription),
}

impl Asset {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Environment(_) => "environment",
        }
    }
}
