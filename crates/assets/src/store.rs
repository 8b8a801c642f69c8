use crate::description::Asset;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Content-addressed asset ID computed from the asset's source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(head))
    }
}

/// Cache of loaded assets, keyed by content hash, with a path index.
///
/// Two paths with identical bytes share one entry.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
    paths: BTreeMap<String, AssetId>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset loaded from `path`. Returns its id; an existing entry
    /// with the same content is kept.
    pub fn insert(&mut self, path: &str, bytes: &[u8], asset: Asset) -> AssetId {
        let id = AssetId::of(bytes);
        self.assets.entry(id).or_insert(asset);
        self.paths.insert(path.to_string(), id);
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn id_for_path(&self, path: &str) -> Option<AssetId> {
        self.paths.get(path).copied()
    }

    pub fn get_by_path(&self, path: &str) -> Option<&Asset> {
        self.id_for_path(path).and_then(|id| self.get(id))
    }

    /// Number of distinct assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::EnvironmentDescription;
    use lumen_common::Color;

    fn env(hex: u32) -> Asset {
        Asset::Environment(EnvironmentDescription::Color {
            color: Color::from_hex(hex),
        })
    }

    #[test]
    fn id_is_stable_per_content() {
        assert_eq!(AssetId::of(b"abc"), AssetId::of(b"abc"));
        assert_ne!(AssetId::of(b"abc"), AssetId::of(b"abd"));
    }

    #[test]
    fn identical_bytes_dedup() {
        let mut store = AssetStore::new();
        let a = store.insert("a.json", b"same", env(0x111111));
        let b = store.insert("copy/a.json", b"same", env(0x111111));
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.id_for_path("copy/a.json"), Some(a));
    }

    #[test]
    fn lookup_by_path() {
        let mut store = AssetStore::new();
        assert!(store.is_empty());
        store.insert("sky.json", b"sky", env(0x3a6ea6));
        assert_eq!(store.get_by_path("sky.json"), Some(&env(0x3a6ea6)));
        assert_eq!(store.get_by_path("missing.json"), None);
    }
}
