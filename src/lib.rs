//! Asset Core - resource management for a real-time rendering loop
//!
//! A shared cache that deduplicates and owns loaded assets (textures, shader
//! programs, and hierarchical material descriptors), with synchronous and
//! background loading paths and reference-count-based reclamation.
//!
//! # Features
//! - Deduplicating asset cache keyed by logical path, one construction per key
//! - Single background loader thread with an in-order task queue
//! - Material inheritance with field-level uniform override merging
//! - Reference-counted garbage collection (the cache sweeps entries it is
//!   the sole owner of)
//! - Structured events for reclamation and background-load failures
//! - Pluggable byte sources and an opaque render-device boundary, with
//!   headless implementations for tests and tooling
//!
//! # Overview
//!
//! Construct an [`AssetManager`] with a [`RenderDevice`] and an
//! [`AssetSource`], then request assets by logical path:
//!
//! ```
//! use std::sync::Arc;
//! use asset_core::{AssetManager, NullDevice};
//! use asset_core::source::MemorySource;
//!
//! let source = MemorySource::new();
//! source.insert("materials/flat.json", br#"{
//!     "shader_paths": { "vertex": "flat.vert", "fragment": "flat.frag" },
//!     "uniforms": { "u_color": [1.0, 1.0, 1.0, 1.0] }
//! }"#.to_vec());
//! source.insert("flat.vert", b"void main() {}".to_vec());
//! source.insert("flat.frag", b"void main() {}".to_vec());
//!
//! let manager = AssetManager::new(Arc::new(NullDevice::new()), Arc::new(source));
//! let asset = manager.get_material_asset("materials/flat.json").unwrap();
//! let material = manager.build_material(&asset).unwrap();
//! assert!(material.vec4("u_color").is_some());
//! ```

pub mod assets;
pub mod cache;
pub mod device;
pub mod error;
pub mod events;
pub mod manager;
pub mod materials;
pub mod source;

pub use assets::{
    Asset, AssetKind, AssetPayload, MaterialAsset, MaterialDescriptor, Program, ShaderStage,
    SharedAsset, Texture, TextureData, TextureFilter, TextureSpec, UniformSpec,
};
pub use cache::{AssetCache, AsyncLoadWorker};
pub use device::{
    NullDevice, ProgramHandle, RenderDevice, TextureHandle, UniformLocation, UniformValue,
};
pub use error::{AssetError, AssetResult};
pub use events::{CacheEvent, EventHub};
pub use manager::AssetManager;
pub use materials::{build_material, resolve_material, Material};
pub use source::{AssetSource, FileSource, MemorySource};
