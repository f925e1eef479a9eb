//! Asset error types.

use thiserror::Error;

use crate::assets::{AssetKind, ShaderStage};

/// Errors that can occur while loading, resolving, or building assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset file or path does not exist in the source.
    #[error("asset not found: {path}")]
    NotFound { path: String },

    /// Reading the asset bytes failed for a reason other than absence.
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The asset bytes exist but could not be parsed or decoded.
    #[error("failed to decode {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    /// A shader stage failed validation on the device.
    #[error("{stage} shader compilation failed: {log}")]
    CompileFailed { stage: ShaderStage, log: String },

    /// Program assembly failed validation on the device.
    #[error("program link failed: {log}")]
    LinkFailed { log: String },

    /// A cache entry exists under the key but holds a different payload kind.
    #[error("cache entry {key:?} holds a {actual} asset, expected {expected}")]
    WrongAssetType {
        key: String,
        expected: AssetKind,
        actual: AssetKind,
    },

    /// A material descriptor names a parent that could not be resolved.
    #[error("material {path:?} names parent {parent:?} which could not be resolved")]
    UnresolvedParent {
        path: String,
        parent: String,
        #[source]
        source: Box<AssetError>,
    },

    /// Resolving a material re-entered a path already being resolved
    /// higher up the same parent chain.
    #[error("cyclic material parent chain at {path:?}")]
    CyclicParentChain { path: String },

    /// A background load task failed. Reported through the worker's log and
    /// event hook, never to a caller.
    #[error("async load of {key:?} failed")]
    AsyncTaskFailed {
        key: String,
        #[source]
        source: Box<AssetError>,
    },
}

impl AssetError {
    /// Map an I/O error from reading `path` to [`AssetError::NotFound`] or
    /// [`AssetError::Io`].
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound { path }
        } else {
            AssetError::Io { path, source: err }
        }
    }
}

/// Convenience alias for results carrying an [`AssetError`].
pub type AssetResult<T> = Result<T, AssetError>;
