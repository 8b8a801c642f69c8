//! Asset loading: model and environment descriptions, content-addressed store.
//!
//! Loading is an explicit acquisition: `AssetLoader::load` returns the asset
//! or an `AssetError`, and callers decide what a failure means for the scene.
//! Assets are identified by a hash of their source bytes, so loading the same
//! file twice yields the same `AssetId`.

mod description;
mod loader;
mod store;

pub use description::{Asset, EnvironmentDescription, ModelDescription, NodeDescription};
pub use loader::{AssetLoader, FileAssetLoader, InMemoryLoader};
pub use store::{AssetId, AssetStore};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("malformed asset {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("asset {path} is a {found}, expected a {expected}")]
    WrongKind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}
