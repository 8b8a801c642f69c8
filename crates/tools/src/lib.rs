//! Developer tooling: debug panel bindings and a scene inspector.
//!
//! # Invariants
//! - A panel never owns the state it edits; every read and write goes through
//!   the state passed in by the caller.
//! - Change callbacks run only after a value passed validation and its setter
//!   succeeded, in registration order.

mod inspector;
mod panel;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use panel::{Control, DebugPanel, PanelError, PanelValue};
