use glam::Vec3;
use lumen_common::NodeId;
use lumen_scene::TextureId;
use serde::{Deserialize, Serialize};

/// One face of a cube map, in the conventional +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn forward(self) -> Vec3 {
        match self {
            Self::PositiveX => Vec3::X,
            Self::NegativeX => Vec3::NEG_X,
            Self::PositiveY => Vec3::Y,
            Self::NegativeY => Vec3::NEG_Y,
            Self::PositiveZ => Vec3::Z,
            Self::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Up vector of the face camera (cube-map convention: -Y for side faces).
    pub fn up(self) -> Vec3 {
        match self {
            Self::PositiveY => Vec3::Z,
            Self::NegativeY => Vec3::NEG_Z,
            _ => Vec3::NEG_Y,
        }
    }

    /// Face a direction falls on: the one with the largest axis component.
    pub fn for_direction(dir: Vec3) -> Self {
        let a = dir.abs();
        if a.x >= a.y && a.x >= a.z {
            if dir.x >= 0.0 { Self::PositiveX } else { Self::NegativeX }
        } else if a.y >= a.z {
            if dir.y >= 0.0 { Self::PositiveY } else { Self::NegativeY }
        } else if dir.z >= 0.0 {
            Self::PositiveZ
        } else {
            Self::NegativeZ
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PositiveX => "px",
            Self::NegativeX => "nx",
            Self::PositiveY => "py",
            Self::NegativeY => "ny",
            Self::PositiveZ => "pz",
            Self::NegativeZ => "nz",
        }
    }
}

/// A shaded sample plus the node that produced it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub color: Vec3,
    pub node: Option<NodeId>,
}

impl Default for Pixel {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            node: None,
        }
    }
}

/// Row-major color + coverage buffer; row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::default(); (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize, reallocating only when the dimensions change.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize)
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Number of pixels covered by `node`.
    pub fn coverage(&self, node: NodeId) -> usize {
        self.pixels.iter().filter(|p| p.node == Some(node)).count()
    }

    /// Number of pixels no geometry covered.
    pub fn background_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.node.is_none()).count()
    }

    pub fn average_color(&self) -> Vec3 {
        if self.pixels.is_empty() {
            return Vec3::ZERO;
        }
        self.pixels.iter().map(|p| p.color).sum::<Vec3>() / self.pixels.len() as f32
    }
}

/// Handle to a cube render target allocated by a renderer.
///
/// Not `Clone`: whoever holds the handle is the only writer of
/// the target. Passes that just sample the texture refer to it by `texture()`.
#[derive(Debug, PartialEq, Eq)]
pub struct CubeRenderTarget {
    texture: TextureId,
    resolution: u32,
}

impl CubeRenderTarget {
    pub(crate) fn new(texture: TextureId, resolution: u32) -> Self {
        Self {
            texture,
            resolution,
        }
    }

    /// Texture id to publish as a scene environment.
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Edge length of each square face in texels.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_for_axis_directions() {
        for face in CubeFace::ALL {
            assert_eq!(CubeFace::for_direction(face.forward()), face);
            assert_eq!(face.up().dot(face.forward()), 0.0);
        }
    }

    #[test]
    fn framebuffer_resize_keeps_allocation_when_unchanged() {
        let mut fb = Framebuffer::new(4, 4);
        fb.pixels_mut()[0].color = Vec3::ONE;
        fb.resize(4, 4);
        assert_eq!(fb.pixels()[0].color, Vec3::ONE);
        fb.resize(8, 2);
        assert_eq!(fb.pixels().len(), 16);
        assert_eq!(fb.pixels()[0].color, Vec3::ZERO);
    }

    #[test]
    fn coverage_counts() {
        let mut fb = Framebuffer::new(2, 2);
        let id = NodeId::new();
        fb.pixels_mut()[1].node = Some(id);
        assert_eq!(fb.coverage(id), 1);
        assert_eq!(fb.background_pixels(), 3);
        assert!(fb.get(2, 0).is_none());
    }
}
