//! Recursive material descriptor resolution.

use crate::assets::{
    Asset, AssetKind, AssetPayload, MaterialAsset, MaterialDescriptor, SharedAsset,
};
use crate::cache::AssetCache;
use crate::error::AssetError;
use crate::source::AssetSource;

/// Resolve the material descriptor at `path`, memoized through `cache`.
///
/// A descriptor without a parent becomes a master material. A descriptor
/// with a parent first resolves the parent through the same cache — so a
/// parent shared by many children is loaded once — and overlays its own
/// uniforms on the parent's tables.
///
/// Resolution is all-or-nothing for `path` itself: a missing file, malformed
/// content, or unresolvable parent caches nothing under `path`. Entries that
/// resolved successfully along the way (a valid parent of a failing child)
/// stay cached.
///
/// Parent chains are cycle-checked: revisiting a path already being resolved
/// higher up the same chain fails with
/// [`AssetError::CyclicParentChain`] instead of recursing unboundedly.
pub fn resolve_material(
    cache: &AssetCache,
    source: &dyn AssetSource,
    path: &str,
) -> Result<SharedAsset, AssetError> {
    let mut in_progress = Vec::new();
    resolve_recursive(cache, source, path, &mut in_progress)
}

fn resolve_recursive(
    cache: &AssetCache,
    source: &dyn AssetSource,
    path: &str,
    in_progress: &mut Vec<String>,
) -> Result<SharedAsset, AssetError> {
    if let Some(existing) = cache.get(path) {
        return if existing.as_material().is_some() {
            Ok(existing)
        } else {
            Err(AssetError::WrongAssetType {
                key: path.to_owned(),
                expected: AssetKind::Material,
                actual: existing.kind(),
            })
        };
    }
    if in_progress.iter().any(|pending| pending == path) {
        return Err(AssetError::CyclicParentChain {
            path: path.to_owned(),
        });
    }

    let bytes = source.read(path)?;
    let descriptor = MaterialDescriptor::parse(path, &bytes)?;

    let material = match descriptor.parent.clone() {
        None => MaterialAsset::master(descriptor),
        Some(parent_path) => {
            in_progress.push(path.to_owned());
            let resolved = resolve_recursive(cache, source, &parent_path, in_progress);
            in_progress.pop();
            let parent = resolved.map_err(|err| match err {
                // A cycle is reported as such to the top-level caller, not
                // as a tower of UnresolvedParent wrappers.
                cycle @ AssetError::CyclicParentChain { .. } => cycle,
                other => AssetError::UnresolvedParent {
                    path: path.to_owned(),
                    parent: parent_path.clone(),
                    source: Box::new(other),
                },
            })?;
            MaterialAsset::instance(descriptor, parent)?
        }
    };

    log::trace!("resolved material {path:?}");
    Ok(cache.insert(path, Asset::new(path, AssetPayload::Material(material))))
}
