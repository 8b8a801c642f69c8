use glam::Vec3;
use lumen_common::{Color, LayerMask, NodeId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape of a drawable node, in local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    /// Ring in the local XY plane around the Z axis.
    Torus { radius: f32, tube: f32 },
    TorusKnot { radius: f32, tube: f32 },
    /// Flat quad in the local XY plane.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    /// Radius of a local-space sphere centred at the origin that encloses the shape.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => 0.5 * Vec3::new(width, height, depth).length(),
            Self::Sphere { radius } => radius,
            Self::Torus { radius, tube } => radius + tube,
            // (2,3) knot: the curve reaches 1.5 * radius from the axis.
            Self::TorusKnot { radius, tube } => 1.5 * radius + tube,
            Self::Plane { width, height } => 0.5 * (width * width + height * height).sqrt(),
        }
    }
}

/// Value of a single shader uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Color(Color),
    Vec3(Vec3),
}

impl UniformValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Whether `other` can replace this value without changing the uniform's type.
    pub fn same_kind(&self, other: &UniformValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

pub type Uniforms = BTreeMap<String, UniformValue>;

/// Surface description consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Material {
    /// Physically based; reads the scene environment for its specular term.
    Standard {
        color: Color,
        roughness: f32,
        metalness: f32,
        #[serde(default = "black")]
        emissive: Color,
    },
    /// Unlit flat color.
    Basic { color: Color },
    /// Compiled program treated as opaque; only its uniforms are visible here.
    Shader {
        uniforms: Uniforms,
        #[serde(default)]
        transparent: bool,
        #[serde(default)]
        additive: bool,
    },
}

fn black() -> Color {
    Color::BLACK
}

impl Default for Material {
    fn default() -> Self {
        Self::Standard {
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Color::BLACK,
        }
    }
}

impl Material {
    pub fn standard(color: Color, roughness: f32, metalness: f32) -> Self {
        Self::Standard {
            color,
            roughness,
            metalness,
            emissive: Color::BLACK,
        }
    }

    pub fn basic(color: Color) -> Self {
        Self::Basic { color }
    }

    pub fn uniforms(&self) -> Option<&Uniforms> {
        match self {
            Self::Shader { uniforms, .. } => Some(uniforms),
            _ => None,
        }
    }

    pub fn uniforms_mut(&mut self) -> Option<&mut Uniforms> {
        match self {
            Self::Shader { uniforms, .. } => Some(uniforms),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    Ambient,
    /// Light travelling along `direction`.
    Directional { direction: Vec3 },
    /// Emits from the node's world position.
    Point { range: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

/// What a node contributes to a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Pure transform; groups a loaded subtree.
    Group,
    Mesh { geometry: Geometry, material: Material },
    /// Sprite cloud drawn with a point material.
    Points {
        positions: Vec<Vec3>,
        scales: Vec<f32>,
        material: Material,
    },
    Light(Light),
}

impl NodeKind {
    pub fn material(&self) -> Option<&Material> {
        match self {
            Self::Mesh { material, .. } | Self::Points { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match self {
            Self::Mesh { material, .. } | Self::Points { material, .. } => Some(material),
            _ => None,
        }
    }
}

/// A node as stored in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub layers: LayerMask,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            layers: LayerMask::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torus_bounds_cover_tube() {
        let g = Geometry::Torus {
            radius: 8.0,
            tube: 0.5,
        };
        assert_eq!(g.bounding_radius(), 8.5);
    }

    #[test]
    fn uniform_kind_check() {
        let a = UniformValue::Float(150.0);
        assert!(a.same_kind(&UniformValue::Float(300.0)));
        assert!(!a.same_kind(&UniformValue::Color(Color::WHITE)));
    }

    #[test]
    fn only_shader_materials_have_uniforms() {
        let mut shader = Material::Shader {
            uniforms: Uniforms::from([("uTime".to_string(), UniformValue::Float(0.0))]),
            transparent: false,
            additive: false,
        };
        assert!(shader.uniforms_mut().is_some());
        assert!(Material::basic(Color::WHITE).uniforms().is_none());
    }
}
