//! Dynamic environment reflection.
//!
//! A `ReflectionCapturer` owns a cube render target and a six-direction
//! `CubeCamera`. Each captured frame it re-renders the scene from the
//! reflective node's position, with the reflective layer masked out, and the
//! target's texture stays published as the scene environment.
//!
//! # Invariants
//! - The capture camera's mask never contains `Layer::REFLECTIVE`.
//! - Only the capturer renders into its target; the main pass samples it.
//! - A capture must run after the frame's transform updates and before the
//!   frame's main render. `FrameLog::check_capture_order` detects violations.

mod capturer;
mod cube_camera;

pub use capturer::{CaptureError, CaptureOutcome, CapturePolicy, CaptureState, ReflectionCapturer};
pub use cube_camera::CubeCamera;
