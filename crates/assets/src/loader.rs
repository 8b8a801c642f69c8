use crate::AssetError;
use crate::description::{Asset, EnvironmentDescription, ModelDescription};
use crate::store::{AssetId, AssetStore};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Source of assets for scene composition.
///
/// `load` either yields the asset or says why it could not; there is no
/// deferred completion.
pub trait AssetLoader {
    fn load(&mut self, path: &str) -> Result<Asset, AssetError>;

    fn load_model(&mut self, path: &str) -> Result<ModelDescription, AssetError> {
        match self.load(path)? {
            Asset::Model(model) => Ok(model),
            other => Err(AssetError::WrongKind {
                path: path.to_string(),
                expected: "model",
                found: other.kind_name(),
            }),
        }
    }

    fn load_environment(&mut self, path: &str) -> Result<EnvironmentDescription, AssetError> {
        match self.load(path)? {
            Asset::Environment(env) => Ok(env),
            other => Err(AssetError::WrongKind {
                path: path.to_string(),
                expected: "environment",
                found: other.kind_name(),
            }),
        }
    }
}

/// Reads JSON asset descriptions relative to a root directory, caching them
/// in an `AssetStore`.
#[derive(Debug)]
pub struct FileAssetLoader {
    root: PathBuf,
    store: AssetStore,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            store: AssetStore::new(),
        }
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Content id of a previously loaded path.
    pub fn id_of(&self, path: &str) -> Option<AssetId> {
        self.store.id_for_path(path)
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&mut self, path: &str) -> Result<Asset, AssetError> {
        if let Some(asset) = self.store.get_by_path(path) {
            return Ok(asset.clone());
        }
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(path.to_string())
            } else {
                AssetError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })?;
        let asset: Asset = serde_json::from_slice(&bytes).map_err(|source| AssetError::Parse {
            path: path.to_string(),
            source,
        })?;
        let id = self.store.insert(path, &bytes, asset.clone());
        tracing::debug!(path, id = id.0, kind = asset.kind_name(), "asset loaded");
        Ok(asset)
    }
}

/// Serves assets registered up front. Used by tests and the CLI's built-in demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    assets: BTreeMap<String, Asset>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, asset: Asset) -> Self {
        self.insert(path, asset);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, asset: Asset) {
        self.assets.insert(path.into(), asset);
    }
}

impl AssetLoader for InMemoryLoader {
    fn load(&mut self, path: &str) -> Result<Asset, AssetError> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}
