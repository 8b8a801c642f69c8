use lumen_capture::CapturePolicy;
use lumen_common::Color;
use lumen_render::ToneMapping;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoScene {
    #[default]
    EnvironmentMap,
    Portal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Everything a demo run can be tuned with. Every field has a default, so an
/// empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub scene: DemoScene,
    /// Edge length of each cube capture face.
    pub cube_resolution: u32,
    pub capture_policy: CapturePolicy,
    pub tone_mapping: ToneMapping,
    pub tone_mapping_exposure: f32,
    pub clear_color: Color,
    pub portal_color_start: Color,
    pub portal_color_end: Color,
    pub fireflies_size: f32,
    pub fireflies_count: usize,
    pub seed: u64,
    /// Load the helmet model into the environment-map scene.
    pub helmet: bool,
    /// Directory of JSON asset descriptions; built-in assets when unset.
    pub assets: Option<PathBuf>,
    pub viewport: ViewportConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene: DemoScene::default(),
            cube_resolution: 256,
            capture_policy: CapturePolicy::EveryFrame,
            tone_mapping: ToneMapping::AcesFilmic,
            tone_mapping_exposure: 1.0,
            clear_color: Color::from_hex(0x201919),
            portal_color_start: Color::from_hex(0xb8f1ff),
            portal_color_end: Color::from_hex(0x8f69b5),
            fireflies_size: 150.0,
            fireflies_count: 40,
            seed: 1,
            helmet: true,
            assets: None,
            viewport: ViewportConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.as_ref().display(), scene = ?config.scene, "config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Reject values no scene can run with. Renderer-specific limits (such as
    /// power-of-two cube sizes) are checked when the capture is activated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid("viewport must be non-empty".into()));
        }
        let dpr = self.viewport.device_pixel_ratio;
        if dpr.is_nan() || dpr <= 0.0 {
            return Err(ConfigError::Invalid("device_pixel_ratio must be positive".into()));
        }
        if !(0.0..=500.0).contains(&self.fireflies_size) {
            return Err(ConfigError::Invalid(format!(
                "fireflies_size {} outside 0..=500",
                self.fireflies_size
            )));
        }
        Ok(())
    }
}
