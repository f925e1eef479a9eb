//! Byte-level asset input.
//!
//! Loaders never open files themselves; they go through an [`AssetSource`] so
//! that the same cache, resolver, and builder code runs against the native
//! filesystem ([`FileSource`]), in-memory data ([`MemorySource`]), or any
//! custom backend (packed archives, downloads) an application provides.
//!
//! Reads are synchronous by design: the cache contract is blocking, and the
//! asynchronous path is a dedicated worker thread, not async I/O.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::AssetError;

/// A source of raw asset bytes addressed by logical path.
///
/// Paths use forward slashes and are relative to the source root.
pub trait AssetSource: Send + Sync + 'static {
    /// Read the entire contents of the file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;

    /// Check whether a file exists at `path`.
    fn exists(&self, path: &str) -> bool;
}

/// Asset source backed by a directory on the native filesystem.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Create a source rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory all reads are resolved against.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl AssetSource for FileSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        std::fs::read(self.root.join(path)).map_err(|e| AssetError::from_io(path, e))
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }
}

/// In-memory asset source for tests and embedded assets.
///
/// Thread-safe and mutable after being handed to a cache or manager.
/// `Clone` is cheap and shares the underlying file table.
///
/// # Example
///
/// ```
/// use asset_core::source::{AssetSource, MemorySource};
///
/// let mem = MemorySource::new();
/// mem.insert("materials/brick.json", b"{}".to_vec());
/// assert!(mem.exists("materials/brick.json"));
/// ```
#[derive(Clone, Default)]
pub struct MemorySource {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemorySource {
    /// Create an empty in-memory source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at the given path, overwriting any existing entry.
    pub fn insert(&self, path: impl Into<String>, data: Vec<u8>) {
        self.files.write().insert(path.into(), data);
    }

    /// Remove a file, returning its data if it existed.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(path)
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound { path: path.to_owned() })
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_existing_file() {
        let mem = MemorySource::new();
        mem.insert("config.json", b"{}".to_vec());
        assert_eq!(mem.read("config.json").unwrap(), b"{}");
    }

    #[test]
    fn read_missing_file() {
        let mem = MemorySource::new();
        assert!(matches!(
            mem.read("nope.png"),
            Err(AssetError::NotFound { .. })
        ));
    }

    #[test]
    fn exists_reflects_insert_and_remove() {
        let mem = MemorySource::new();
        assert!(!mem.exists("file.txt"));
        mem.insert("file.txt", vec![1, 2, 3]);
        assert!(mem.exists("file.txt"));
        assert_eq!(mem.remove("file.txt"), Some(vec![1, 2, 3]));
        assert!(!mem.exists("file.txt"));
    }

    #[test]
    fn clone_shares_files() {
        let mem = MemorySource::new();
        let clone = mem.clone();
        mem.insert("shared.txt", b"data".to_vec());
        assert_eq!(clone.read("shared.txt").unwrap(), b"data");
    }

    #[test]
    fn file_source_missing_is_not_found() {
        let fs = FileSource::new("/definitely/not/a/real/root");
        assert!(matches!(
            fs.read("missing.png"),
            Err(AssetError::NotFound { .. })
        ));
        assert!(!fs.exists("missing.png"));
    }
}
