//! Scene composition for the demos.
//!
//! A `SceneComposer` builds a scene graph once, through an `AssetLoader`, and
//! then animates it with `advance(elapsed)`. Animated values are pure
//! functions of elapsed time and are never integrated, so replaying a time
//! sequence reproduces the same scene state.
//!
//! - `EnvironmentMapScene`: a metallic torus on the reflective layer, lit by a
//!   live cube capture of everything else.
//! - `PortalScene`: a loaded portal model with shader materials and a seeded
//!   firefly cloud.

mod builtin;
mod composer;
mod config;
mod env_map;
mod portal;
mod rng;

pub use builtin::{ENVIRONMENT_PATH, HELMET_PATH, PORTAL_PATH, builtin_assets};
pub use composer::{ComposeError, SceneComposer};
pub use config::{ConfigError, DemoConfig, DemoScene, ViewportConfig};
pub use env_map::{EnvironmentMapScene, donut_tilt};
pub use portal::{PortalNodes, PortalScene};
pub use rng::SplitMix64;

/// Composer for the scene `config` selects.
pub fn composer_for(config: &DemoConfig) -> Box<dyn SceneComposer> {
    match config.scene {
        DemoScene::EnvironmentMap => Box::new(EnvironmentMapScene::new(config)),
        DemoScene::Portal => Box::new(PortalScene::new(config)),
    }
}
