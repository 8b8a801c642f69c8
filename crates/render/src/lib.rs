//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene graph.
//! - Only the holder of a `CubeRenderTarget` handle can render into it; every
//!   other pass only samples the texture it publishes.
//! - Every pass is recorded in the `FrameLog` with a monotonic sequence number.
//!
//! The `Renderer` trait is the seam a GPU backend plugs into. `SoftwareRenderer`
//! is a headless reference backend: it sphere-traces node shapes per pixel so
//! capture contents can be inspected in tests and from the CLI.

mod camera;
mod frame_log;
mod renderer;
mod report;
mod software;
mod target;
mod tonemap;

pub use camera::PerspectiveCamera;
pub use frame_log::{FrameLog, OrderingViolation, PassKind, PassRecord};
pub use renderer::{Capabilities, RenderError, RenderSettings, Renderer};
pub use report::TextReport;
pub use software::SoftwareRenderer;
pub use target::{CubeFace, CubeRenderTarget, Framebuffer, Pixel};
pub use tonemap::ToneMapping;
