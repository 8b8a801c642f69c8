use serde::{Deserialize, Serialize};

/// A single render layer index in `0..32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Layer(u8);

impl Layer {
    /// Layer every node and camera starts on.
    pub const DEFAULT: Layer = Layer(0);
    /// Layer carrying objects that reflect the live environment capture.
    pub const REFLECTIVE: Layer = Layer(1);

    /// Returns `None` for indices outside `0..32`.
    pub const fn new(index: u8) -> Option<Self> {
        if index < 32 { Some(Self(index)) } else { None }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    const fn bit(self) -> u32 {
        1 << self.0
    }
}

/// Bitset of render layers.
///
/// Attached to nodes (which layers the node lives on) and to cameras (which
/// layers the camera draws). A camera renders a node iff the masks intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask containing only `layer`.
    pub const fn only(layer: Layer) -> Self {
        Self(layer.bit())
    }

    /// Replace the mask with exactly `layer`.
    pub fn set(&mut self, layer: Layer) {
        self.0 = layer.bit();
    }

    pub fn enable(&mut self, layer: Layer) {
        self.0 |= layer.bit();
    }

    pub fn disable(&mut self, layer: Layer) {
        self.0 &= !layer.bit();
    }

    pub fn with(mut self, layer: Layer) -> Self {
        self.enable(layer);
        self
    }

    pub fn without(mut self, layer: Layer) -> Self {
        self.disable(layer);
        self
    }

    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for LayerMask {
    /// Nodes start on the default layer only.
    fn default() -> Self {
        Self::only(Layer::DEFAULT)
    }
}
