use lumen_assets::{AssetError, AssetLoader};
use lumen_common::NodeId;
use lumen_render::{PerspectiveCamera, RenderSettings};
use lumen_scene::{SceneError, SceneGraph};

/// Errors from building a scene.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("asset load failed: {0}")]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Builds a scene once and animates it per frame.
pub trait SceneComposer {
    fn name(&self) -> &'static str;

    /// Build the scene graph. Any previously built node handles are replaced.
    fn build_scene(&mut self, loader: &mut dyn AssetLoader) -> Result<SceneGraph, ComposeError>;

    /// Apply the animation state at `elapsed` seconds. Before `build_scene`
    /// there is nothing to animate and this is a no-op.
    fn advance(&self, scene: &mut SceneGraph, elapsed: f32) -> Result<(), SceneError>;

    fn main_camera(&self, aspect: f32) -> PerspectiveCamera;

    /// Node whose surroundings are captured for reflections, if the scene has one.
    fn reflective_node(&self) -> Option<NodeId>;

    /// Renderer output settings this scene expects.
    fn configure(&self, settings: &mut RenderSettings);

    /// Called after a resize with the new effective pixel ratio.
    fn set_pixel_ratio(&self, _scene: &mut SceneGraph, _ratio: f32) -> Result<(), SceneError> {
        Ok(())
    }
}
