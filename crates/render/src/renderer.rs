use crate::camera::PerspectiveCamera;
use crate::frame_log::FrameLog;
use crate::target::{CubeFace, CubeRenderTarget, Framebuffer};
use crate::tonemap::ToneMapping;
use lumen_common::{Color, NodeId};
use lumen_scene::{SceneGraph, TextureId, UniformValue};

/// Errors from render operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("unknown render target {0:?}")]
    UnknownTarget(TextureId),
    #[error("cube target size must be non-zero")]
    ZeroSizedTarget,
    #[error("cube target size {requested} exceeds limit {max}")]
    TargetTooLarge { requested: u32, max: u32 },
}

/// What a backend can do. Mirrors the limits a GPU context reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Cube render targets must have power-of-two edges (WebGL1-class hosts).
    pub power_of_two_cube_targets: bool,
    pub max_cube_resolution: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            power_of_two_cube_targets: false,
            max_cube_resolution: 4096,
        }
    }
}

/// Per-renderer output settings the debug panel can drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub clear_color: Color,
    pub tone_mapping: ToneMapping,
    pub tone_mapping_exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            tone_mapping: ToneMapping::None,
            tone_mapping_exposure: 1.0,
        }
    }
}

/// Renderer-agnostic interface. All backends implement this trait.
///
/// The renderer reads the scene and a camera, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    fn capabilities(&self) -> Capabilities;

    /// Start a new frame; returns its index. Passes are logged against it.
    fn begin_frame(&mut self) -> u64;

    fn current_frame(&self) -> u64;

    /// Allocate a cube render target with square faces of `resolution` texels.
    fn create_cube_target(&mut self, resolution: u32) -> Result<CubeRenderTarget, RenderError>;

    /// Release a target. The texture id becomes unknown afterwards.
    fn dispose_cube_target(&mut self, target: CubeRenderTarget);

    /// Render one cube face from `camera` into `target`, overwriting it in place.
    fn render_cube_face(
        &mut self,
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        target: &CubeRenderTarget,
        face: CubeFace,
    ) -> Result<(), RenderError>;

    /// Render the scene to the main surface.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError>;

    /// Logical surface size in CSS-style pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    fn pixel_ratio(&self) -> f32;

    fn settings(&self) -> &RenderSettings;

    fn settings_mut(&mut self) -> &mut RenderSettings;

    fn frame_log(&self) -> &FrameLog;

    /// Uniform value last uploaded for `node`'s shader program.
    fn uploaded_uniform(&self, node: NodeId, name: &str) -> Option<UniformValue>;

    /// Main surface contents after the last `render`.
    fn surface(&self) -> &Framebuffer;

    /// Published contents of a cube face, if the target exists.
    fn cube_face(&self, texture: TextureId, face: CubeFace) -> Option<&Framebuffer>;
}
