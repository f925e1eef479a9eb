//! Asset data model.
//!
//! Every cached resource is an [`Asset`]: a canonical path plus a typed
//! payload. Payloads form a closed sum ([`AssetPayload`]) so consumers match
//! exhaustively instead of downcasting. Shared ownership is expressed with
//! [`SharedAsset`] (`Arc<Asset>`); the cache holds one strong reference per
//! entry and hands out clones, which is what reference-count-based
//! reclamation keys on.

mod material;
mod shader;
mod texture;

use std::fmt;
use std::sync::Arc;

pub use material::{MaterialAsset, MaterialDescriptor, TextureSpec, UniformSpec};
pub use shader::{Program, ShaderStage};
pub use texture::{Texture, TextureData, TextureFilter};

/// Shared handle to a cached asset.
pub type SharedAsset = Arc<Asset>;

/// A loaded resource identified by its logical path.
#[derive(Debug)]
pub struct Asset {
    path: String,
    payload: AssetPayload,
}

/// Type-specific payload of an [`Asset`].
#[derive(Debug)]
pub enum AssetPayload {
    Texture(Texture),
    Program(Program),
    Material(MaterialAsset),
}

/// Payload kind, used for diagnostics and type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Texture,
    Program,
    Material,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Texture => write!(f, "texture"),
            AssetKind::Program => write!(f, "program"),
            AssetKind::Material => write!(f, "material"),
        }
    }
}

impl Asset {
    pub fn new(path: impl Into<String>, payload: AssetPayload) -> Self {
        Self {
            path: path.into(),
            payload,
        }
    }

    /// Canonical identity key of this asset.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn payload(&self) -> &AssetPayload {
        &self.payload
    }

    pub fn kind(&self) -> AssetKind {
        match self.payload {
            AssetPayload::Texture(_) => AssetKind::Texture,
            AssetPayload::Program(_) => AssetKind::Program,
            AssetPayload::Material(_) => AssetKind::Material,
        }
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match &self.payload {
            AssetPayload::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_program(&self) -> Option<&Program> {
        match &self.payload {
            AssetPayload::Program(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&MaterialAsset> {
        match &self.payload {
            AssetPayload::Material(m) => Some(m),
            _ => None,
        }
    }
}
