//! The shared asset map.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::assets::{Asset, SharedAsset};
use crate::error::AssetError;
use crate::events::{CacheEvent, EventHub};

/// Deduplicating owner of loaded assets, keyed by logical path.
///
/// The cache holds one strong reference per entry and hands out shared
/// clones. All map access goes through a single mutex; see
/// [`get_or_load`](AssetCache::get_or_load) for the locking contract.
#[derive(Default)]
pub struct AssetCache {
    assets: Mutex<HashMap<String, SharedAsset>>,
    events: EventHub,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the asset cached under `key`, loading and inserting it first
    /// if absent.
    ///
    /// The whole check-construct-insert sequence runs under the cache
    /// mutex: two callers racing on the same unseen key cannot both invoke
    /// `load` — the second blocks until the first insertion completes, then
    /// observes the cached value. The flip side is that a slow synchronous
    /// load stalls every other cache operation for its duration; background
    /// loads avoid this by constructing outside the lock and publishing via
    /// [`insert`](AssetCache::insert).
    ///
    /// `load` must not call back into this cache, or it will deadlock.
    ///
    /// On failure nothing is inserted and the error is returned.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<SharedAsset, AssetError>
    where
        F: FnOnce() -> Result<Asset, AssetError>,
    {
        let mut assets = self.assets.lock();
        if let Some(existing) = assets.get(key) {
            log::trace!("cache hit for {key:?}");
            return Ok(existing.clone());
        }
        let asset = Arc::new(load()?);
        assets.insert(key.to_owned(), asset.clone());
        log::trace!("cache loaded {key:?}");
        Ok(asset)
    }

    /// Publish an asset constructed outside the critical section.
    ///
    /// If the key is already occupied the existing asset is kept and
    /// returned, so every holder of the key converges on one shared
    /// instance even when a synchronous and a background load race.
    pub fn insert(&self, key: &str, asset: Asset) -> SharedAsset {
        let mut assets = self.assets.lock();
        match assets.entry(key.to_owned()) {
            Entry::Occupied(slot) => {
                log::warn!("discarding duplicate asset for occupied key {key:?}");
                slot.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(Arc::new(asset)).clone(),
        }
    }

    /// Look up `key` without loading.
    pub fn get(&self, key: &str) -> Option<SharedAsset> {
        self.assets.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.lock().is_empty()
    }

    /// Remove every entry the cache is the sole owner of.
    ///
    /// An entry whose strong count is exactly 1 has no live external
    /// handle; anything referenced by a caller — or by a cached material
    /// instance holding its parent — survives. Returns the number of
    /// reclaimed entries and emits one [`CacheEvent::Reclaimed`] per entry.
    pub fn garbage_collect(&self) -> usize {
        let reclaimed: Vec<String> = {
            let mut assets = self.assets.lock();
            let mut keys = Vec::new();
            assets.retain(|key, asset| {
                if Arc::strong_count(asset) == 1 {
                    keys.push(key.clone());
                    false
                } else {
                    true
                }
            });
            keys
        };
        for key in &reclaimed {
            log::debug!("reclaimed cache entry {key:?}");
            self.events.emit(CacheEvent::Reclaimed { key: key.clone() });
        }
        reclaimed.len()
    }

    /// Observability hook for reclamation and background-load failures.
    pub fn events(&self) -> &EventHub {
        &self.events
    }
}
