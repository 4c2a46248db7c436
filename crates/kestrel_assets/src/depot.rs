//! Asset cache
//!
//! The depot holds the one canonical instance of every loaded asset. It is
//! partitioned by [`AssetKind`] so names never collide across kinds and a
//! whole kind can be evicted at once. Only fully uploaded assets are ever
//! inserted, and the first insert for a key wins.

use crate::asset::{
    Animation, Asset, AssetId, AssetKind, Material, Mesh, ModelTemplate, Shader, Sound, Texture,
};
use crate::font::Font;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Per-kind entry counts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepotStats {
    /// Entries per kind, indexed by [`AssetKind::index`]
    pub counts: [usize; AssetKind::COUNT],
}

impl DepotStats {
    /// Entries of one kind
    pub fn count(&self, kind: AssetKind) -> usize {
        self.counts[kind.index()]
    }

    /// Entries across all kinds
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// De-duplicating store of loaded assets
#[derive(Debug, Default)]
pub struct Depot {
    partitions: [FxHashMap<AssetId, Asset>; AssetKind::COUNT],
}

impl Depot {
    /// Create an empty depot
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an asset. Absence is normal and usually triggers a load.
    pub fn fetch(&self, kind: AssetKind, name: &str) -> Option<&Asset> {
        self.partitions[kind.index()].get(&AssetId::new(kind, name))
    }

    /// Look up an asset by its identifier
    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        let kind = id.kind()?;
        self.partitions[kind.index()].get(&id)
    }

    /// Check for an asset by its identifier
    pub fn contains(&self, id: AssetId) -> bool {
        self.get(id).is_some()
    }

    /// Insert an asset
    ///
    /// Returns false, leaving the existing entry in place, when an asset of
    /// the same kind and name is already cached.
    pub fn cache(&mut self, asset: impl Into<Asset>) -> bool {
        let asset = asset.into();
        let kind = asset.kind();
        let id = asset.id();
        let partition = &mut self.partitions[kind.index()];
        if partition.contains_key(&id) {
            tracing::warn!(kind = %kind, asset = asset.name(), "asset already cached");
            return false;
        }
        partition.insert(id, asset);
        true
    }

    /// Remove and return an asset
    pub fn remove(&mut self, kind: AssetKind, name: &str) -> Option<Asset> {
        self.partitions[kind.index()].remove(&AssetId::new(kind, name))
    }

    /// Evict every asset of one kind
    pub fn clear_kind(&mut self, kind: AssetKind) {
        self.partitions[kind.index()].clear();
    }

    /// Evict everything
    pub fn clear(&mut self) {
        for partition in &mut self.partitions {
            partition.clear();
        }
    }

    /// Number of cached assets
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.len()).sum()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(|p| p.is_empty())
    }

    /// Per-kind counts
    pub fn stats(&self) -> DepotStats {
        let mut stats = DepotStats::default();
        for (count, partition) in stats.counts.iter_mut().zip(&self.partitions) {
            *count = partition.len();
        }
        stats
    }

    pub fn font(&self, name: &str) -> Option<Arc<Font>> {
        self.fetch(AssetKind::Font, name)?.as_font().cloned()
    }

    pub fn shader(&self, name: &str) -> Option<Arc<Shader>> {
        self.fetch(AssetKind::Shader, name)?.as_shader().cloned()
    }

    pub fn material(&self, name: &str) -> Option<Arc<Material>> {
        self.fetch(AssetKind::Material, name)?.as_material().cloned()
    }

    pub fn mesh(&self, name: &str) -> Option<Arc<Mesh>> {
        self.fetch(AssetKind::Mesh, name)?.as_mesh().cloned()
    }

    pub fn texture(&self, name: &str) -> Option<Arc<Texture>> {
        self.fetch(AssetKind::Texture, name)?.as_texture().cloned()
    }

    pub fn sound(&self, name: &str) -> Option<Arc<Sound>> {
        self.fetch(AssetKind::Sound, name)?.as_sound().cloned()
    }

    pub fn animation(&self, name: &str) -> Option<Arc<Animation>> {
        self.fetch(AssetKind::Animation, name)?.as_animation().cloned()
    }

    pub fn model(&self, name: &str) -> Option<Arc<ModelTemplate>> {
        self.fetch(AssetKind::Model, name)?.as_model().cloned()
    }
}
