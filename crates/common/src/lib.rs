//! Shared types used across the lumen crates.
//!
//! # Invariants
//! - `Transform` composes as scale, then rotation, then translation.
//! - `LayerMask` membership is a plain bit test; an empty mask renders nothing.

mod color;
mod layers;
mod types;

pub use color::{Color, ColorError};
pub use layers::{Layer, LayerMask};
pub use types::{NodeId, Transform};
