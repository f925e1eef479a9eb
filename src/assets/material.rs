//! Material descriptor assets.
//!
//! A material descriptor is a JSON file naming shader stage paths and a
//! uniform table, and optionally a `parent` descriptor it inherits from:
//!
//! ```json
//! {
//!     "parent": "materials/wall.json",
//!     "shader_paths": { "vertex": "shaders/lit.vert", "fragment": "shaders/lit.frag" },
//!     "uniforms": {
//!         "u_brightness": 1.0,
//!         "u_tint": [1.0, 0.5, 0.5],
//!         "u_color": [1.0, 1.0, 1.0, 1.0],
//!         "u_albedo": { "path": "textures/wall.png", "filter": "pixel_perfect" }
//!     }
//! }
//! ```
//!
//! A descriptor without a parent is a *master* material. A descriptor with a
//! parent is a *material instance*: it inherits the parent's shader paths
//! verbatim and overlays its own uniform entries key-by-key on the parent's
//! table — the instance wins on collision, every other parent entry
//! survives unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assets::{AssetKind, SharedAsset, ShaderStage, TextureFilter};
use crate::error::AssetError;

/// Declared value of a single uniform in a material descriptor.
///
/// The wire shapes are positional: a bare number is a scalar, a 3-element
/// array a vec3, a 4-element array a vec4, and an object a texture
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniformSpec {
    Scalar(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Texture(TextureSpec),
}

/// Texture reference inside a uniform table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureSpec {
    pub path: String,
    #[serde(default)]
    pub filter: TextureFilter,
}

/// Parsed material descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub shader_paths: BTreeMap<ShaderStage, String>,
    #[serde(default)]
    pub uniforms: BTreeMap<String, UniformSpec>,
}

impl MaterialDescriptor {
    /// Parse descriptor JSON. `path` is used for error reporting only.
    pub fn parse(path: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        serde_json::from_slice(bytes).map_err(|e| AssetError::DecodeFailed {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// A resolved material: effective shader paths and uniform table, with the
/// parent chain already folded in.
///
/// Master materials have no parent. Instances keep a shared handle to their
/// resolved parent, which also keeps the parent's cache entry alive for as
/// long as any instance of it is.
#[derive(Debug)]
pub struct MaterialAsset {
    shader_paths: BTreeMap<ShaderStage, String>,
    uniforms: BTreeMap<String, UniformSpec>,
    parent: Option<SharedAsset>,
}

impl MaterialAsset {
    /// Construct a master material directly from its descriptor.
    pub fn master(descriptor: MaterialDescriptor) -> Self {
        Self {
            shader_paths: descriptor.shader_paths,
            uniforms: descriptor.uniforms,
            parent: None,
        }
    }

    /// Construct an instance of `parent`, overlaying the descriptor's own
    /// uniform entries on the parent's table.
    ///
    /// Shader paths are inherited from the parent; a stage table in the
    /// instance descriptor is ignored.
    pub fn instance(
        descriptor: MaterialDescriptor,
        parent: SharedAsset,
    ) -> Result<Self, AssetError> {
        let (shader_paths, uniforms) = {
            let base = parent.as_material().ok_or_else(|| AssetError::WrongAssetType {
                key: parent.path().to_owned(),
                expected: AssetKind::Material,
                actual: parent.kind(),
            })?;
            if !descriptor.shader_paths.is_empty() {
                log::debug!(
                    "material instance ignores its own shader_paths; stages come from parent {:?}",
                    parent.path()
                );
            }
            let mut uniforms = base.uniforms.clone();
            uniforms.extend(descriptor.uniforms);
            (base.shader_paths.clone(), uniforms)
        };
        Ok(Self {
            shader_paths,
            uniforms,
            parent: Some(parent),
        })
    }

    /// Effective stage-path table.
    pub fn shader_paths(&self) -> &BTreeMap<ShaderStage, String> {
        &self.shader_paths
    }

    /// Effective uniform table, parent entries merged in.
    pub fn uniforms(&self) -> &BTreeMap<String, UniformSpec> {
        &self.uniforms
    }

    /// The resolved parent asset, if this is an instance.
    pub fn parent(&self) -> Option<&SharedAsset> {
        self.parent.as_ref()
    }

    pub fn is_instance(&self) -> bool {
        self.parent.is_some()
    }

    /// The effective tables as a standalone descriptor (no parent link).
    ///
    /// Serializing this reproduces the same logical table for any two
    /// materials with equal effective state, independent of the order their
    /// chains were resolved in.
    pub fn effective_descriptor(&self) -> MaterialDescriptor {
        MaterialDescriptor {
            parent: None,
            shader_paths: self.shader_paths.clone(),
            uniforms: self.uniforms.clone(),
        }
    }
}
