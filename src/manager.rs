//! Asset manager façade.
//!
//! [`AssetManager`] ties the pieces together: it owns the cache and the
//! background worker, and carries the device and source handles every loader
//! needs. Applications create one per context and pass it around explicitly —
//! there is no process-wide instance, which keeps tests isolated and makes
//! ownership of the cache unambiguous.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::assets::{
    Asset, AssetKind, AssetPayload, Program, ShaderStage, SharedAsset, Texture, TextureFilter,
};
use crate::cache::{AssetCache, AsyncLoadWorker};
use crate::device::RenderDevice;
use crate::error::AssetError;
use crate::events::CacheEvent;
use crate::materials::{self, Material};
use crate::source::{AssetSource, FileSource};

/// Owner of the asset cache, its background loader, and the device/source
/// pair all loads go through.
pub struct AssetManager {
    // Field order matters: the worker drops (closing its queue, draining,
    // and joining) before the manager's remaining handles go away.
    worker: AsyncLoadWorker,
    cache: Arc<AssetCache>,
    device: Arc<dyn RenderDevice>,
    source: Arc<dyn AssetSource>,
}

impl AssetManager {
    /// Create a manager loading through the given device and source.
    pub fn new(device: Arc<dyn RenderDevice>, source: Arc<dyn AssetSource>) -> Self {
        let cache = Arc::new(AssetCache::new());
        let worker = AsyncLoadWorker::spawn(cache.clone());
        Self {
            worker,
            cache,
            device,
            source,
        }
    }

    /// Create a manager reading assets from a directory on disk.
    pub fn with_root(device: Arc<dyn RenderDevice>, root: impl Into<PathBuf>) -> Self {
        Self::new(device, Arc::new(FileSource::new(root)))
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Subscribe to reclamation and async-failure events.
    pub fn subscribe_events(&self) -> Receiver<CacheEvent> {
        self.cache.events().subscribe()
    }

    /// Get or synchronously load the texture at `path`, cached under `key`.
    pub fn get_texture(
        &self,
        key: &str,
        path: &str,
        filter: TextureFilter,
    ) -> Result<SharedAsset, AssetError> {
        let asset = self.cache.get_or_load(key, || {
            let texture =
                Texture::load(self.source.as_ref(), self.device.as_ref(), path, filter)?;
            Ok(Asset::new(path, AssetPayload::Texture(texture)))
        })?;
        expect_kind(key, &asset, AssetKind::Texture)?;
        Ok(asset)
    }

    /// Get or synchronously compile the program for `stage_paths`, cached
    /// under `key`.
    pub fn get_program(
        &self,
        key: &str,
        stage_paths: &BTreeMap<ShaderStage, String>,
    ) -> Result<SharedAsset, AssetError> {
        let asset = self.cache.get_or_load(key, || {
            let program =
                Program::load(self.source.as_ref(), self.device.as_ref(), stage_paths)?;
            Ok(Asset::new(key, AssetPayload::Program(program)))
        })?;
        expect_kind(key, &asset, AssetKind::Program)?;
        Ok(asset)
    }

    /// Resolve the material descriptor at `path`, parents included.
    pub fn get_material_asset(&self, path: &str) -> Result<SharedAsset, AssetError> {
        materials::resolve_material(&self.cache, self.source.as_ref(), path)
    }

    /// Assemble a runtime [`Material`] from a resolved material asset.
    pub fn build_material(&self, material: &SharedAsset) -> Result<Material, AssetError> {
        let material_asset = material.as_material().ok_or_else(|| {
            AssetError::WrongAssetType {
                key: material.path().to_owned(),
                expected: AssetKind::Material,
                actual: material.kind(),
            }
        })?;
        materials::build_material(
            &self.cache,
            self.source.as_ref(),
            self.device.as_ref(),
            material_asset,
        )
    }

    /// Queue a custom load to run on the background worker.
    ///
    /// The result is published under `key` when the task completes; failures
    /// are logged and reported through the event hook only.
    pub fn enqueue_load<F>(&self, key: impl Into<String>, load: F)
    where
        F: FnOnce() -> Result<Asset, AssetError> + Send + 'static,
    {
        self.worker.enqueue(key, load);
    }

    /// Queue a texture load on the background worker.
    pub fn enqueue_texture_load(&self, key: impl Into<String>, path: &str, filter: TextureFilter) {
        let source = self.source.clone();
        let device = self.device.clone();
        let path = path.to_owned();
        self.worker.enqueue(key, move || {
            let texture = Texture::load(source.as_ref(), device.as_ref(), &path, filter)?;
            Ok(Asset::new(path, AssetPayload::Texture(texture)))
        });
    }

    /// Block until no background load is pending.
    pub fn wait_for_all_loads(&self) {
        self.worker.wait_for_all_loads();
    }

    /// Number of background loads accepted but not yet finished.
    pub fn pending_loads(&self) -> usize {
        self.worker.pending_loads()
    }

    /// Sweep cache entries no one else references. Returns the number
    /// reclaimed.
    pub fn garbage_collect(&self) -> usize {
        self.cache.garbage_collect()
    }
}

fn expect_kind(key: &str, asset: &SharedAsset, expected: AssetKind) -> Result<(), AssetError> {
    if asset.kind() == expected {
        Ok(())
    } else {
        Err(AssetError::WrongAssetType {
            key: key.to_owned(),
            expected,
            actual: asset.kind(),
        })
    }
}
