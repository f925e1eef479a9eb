//! Material resolution and runtime assembly.
//!
//! [`resolve_material`] turns a descriptor file and its parent chain into a
//! cached [`MaterialAsset`](crate::assets::MaterialAsset); [`build_material`]
//! turns a resolved material into an ephemeral [`Material`] ready for a draw
//! call.

mod resolver;
mod runtime;

pub use resolver::resolve_material;
pub use runtime::{build_material, Material};
