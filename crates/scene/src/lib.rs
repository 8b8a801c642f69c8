//! Scene graph: the retained state every pass renders from.
//!
//! # Invariants
//! - Nodes are created at build time and never removed; the graph lives as
//!   long as the process.
//! - All mutations go through explicit operations and bump `revision`.
//! - A node is drawn by a camera iff their layer masks intersect and the node
//!   and all of its ancestors are visible.

pub mod environment;
pub mod graph;
pub mod node;

pub use environment::{Background, Environment, SkyGradient, TextureId};
pub use graph::{SceneError, SceneGraph};
pub use node::{Geometry, Light, LightKind, Material, NodeKind, SceneNode, UniformValue, Uniforms};
