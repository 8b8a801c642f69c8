//! Host layer: owns the per-frame ordering of a composed demo.
//!
//! # Invariants
//! - Within a tick: animation, then reflection capture, then the main render.
//! - Events are applied between ticks, never during one.
//! - Debug panel edits write into `DemoState` immediately and are uploaded by
//!   the renderer at the next render.

mod clock;
mod event;
mod frame_loop;
mod panels;
mod viewport;

pub use clock::Clock;
pub use event::HostEvent;
pub use frame_loop::{DemoState, FrameLoop, FrameReport, HostError};
pub use viewport::{MAX_PIXEL_RATIO, Viewport};
