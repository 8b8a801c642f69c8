use glam::Vec3;
use lumen_common::Color;
use serde::{Deserialize, Serialize};

/// Handle to a texture owned by a renderer.
///
/// The scene only references textures; the renderer that allocated the id
/// holds the texel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Procedural sky used as a background and as a static environment source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyGradient {
    pub zenith: Color,
    pub horizon: Color,
    pub ground: Color,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            zenith: Color::from_hex(0x3a6ea6),
            horizon: Color::from_hex(0xb8d4e8),
            ground: Color::from_hex(0x4a3b2c),
        }
    }
}

impl SkyGradient {
    /// Radiance seen along the (normalized) direction `dir`.
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let y = dir.y.clamp(-1.0, 1.0);
        if y >= 0.0 {
            self.horizon.to_vec3().lerp(self.zenith.to_vec3(), y)
        } else {
            self.horizon.to_vec3().lerp(self.ground.to_vec3(), -y)
        }
    }
}

/// What fills pixels no geometry covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Background {
    Color(Color),
    Sky(SkyGradient),
}

/// Source of ambient/specular lighting for physically based materials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Sky(SkyGradient),
    /// A cube texture, typically a live capture.
    Cube(TextureId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_sample_endpoints() {
        let sky = SkyGradient::default();
        assert_eq!(sky.sample(Vec3::Y), sky.zenith.to_vec3());
        assert_eq!(sky.sample(Vec3::X), sky.horizon.to_vec3());
        assert_eq!(sky.sample(Vec3::NEG_Y), sky.ground.to_vec3());
    }
}
