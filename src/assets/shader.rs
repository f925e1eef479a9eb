//! Shader program assets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::device::{ProgramHandle, RenderDevice, UniformLocation};
use crate::error::AssetError;
use crate::source::AssetSource;

/// Shader stage in the graphics pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A linked shader program.
///
/// Uniform binding locations are resolved against the device on first use
/// and memoized for the program's lifetime; a name is never queried twice,
/// including names the program does not have.
#[derive(Debug)]
pub struct Program {
    handle: ProgramHandle,
    locations: Mutex<HashMap<String, Option<UniformLocation>>>,
}

impl Program {
    /// Read the stage sources named in `stage_paths`, compile, and link.
    pub fn load(
        source: &dyn AssetSource,
        device: &dyn RenderDevice,
        stage_paths: &BTreeMap<ShaderStage, String>,
    ) -> Result<Self, AssetError> {
        let mut sources = BTreeMap::new();
        for (stage, path) in stage_paths {
            let bytes = source.read(path)?;
            let text = String::from_utf8(bytes).map_err(|e| AssetError::DecodeFailed {
                path: path.clone(),
                reason: format!("shader source is not valid UTF-8: {e}"),
            })?;
            sources.insert(*stage, text);
        }
        let handle = device.compile_program(&sources)?;
        log::trace!("linked program from {} stage(s)", sources.len());
        Ok(Self {
            handle,
            locations: Mutex::new(HashMap::new()),
        })
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Resolve the location of a named uniform, memoized per program.
    pub fn uniform_location(
        &self,
        device: &dyn RenderDevice,
        name: &str,
    ) -> Option<UniformLocation> {
        let mut cache = self.locations.lock();
        if let Some(cached) = cache.get(name) {
            return *cached;
        }
        let location = device.uniform_location(self.handle, name);
        cache.insert(name.to_owned(), location);
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::NullDevice;
    use crate::source::MemorySource;

    fn stage_paths() -> BTreeMap<ShaderStage, String> {
        let mut paths = BTreeMap::new();
        paths.insert(ShaderStage::Vertex, "shaders/basic.vert".to_string());
        paths.insert(ShaderStage::Fragment, "shaders/basic.frag".to_string());
        paths
    }

    fn populated_source() -> MemorySource {
        let source = MemorySource::new();
        source.insert("shaders/basic.vert", b"void main() {}".to_vec());
        source.insert("shaders/basic.frag", b"void main() {}".to_vec());
        source
    }

    #[test]
    fn stage_serde_names() {
        assert_eq!(
            serde_json::to_string(&ShaderStage::Vertex).unwrap(),
            "\"vertex\""
        );
        let stage: ShaderStage = serde_json::from_str("\"fragment\"").unwrap();
        assert_eq!(stage, ShaderStage::Fragment);
    }

    #[test]
    fn unknown_stage_fails_parsing() {
        assert!(serde_json::from_str::<ShaderStage>("\"geometry\"").is_err());
    }

    #[test]
    fn load_compiles_all_stages() {
        let device = NullDevice::new();
        let program = Program::load(&populated_source(), &device, &stage_paths()).unwrap();
        assert_ne!(program.handle().raw(), 0);
    }

    #[test]
    fn load_missing_stage_source() {
        let source = MemorySource::new();
        source.insert("shaders/basic.vert", b"void main() {}".to_vec());
        let device = NullDevice::new();
        let err = Program::load(&source, &device, &stage_paths()).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn load_rejects_non_utf8_source() {
        let source = populated_source();
        source.insert("shaders/basic.frag", vec![0xFF, 0xFE, 0x00]);
        let device = NullDevice::new();
        let err = Program::load(&source, &device, &stage_paths()).unwrap_err();
        assert!(matches!(err, AssetError::DecodeFailed { .. }));
    }

    #[test]
    fn uniform_locations_resolve_once() {
        let device = NullDevice::new();
        let program = Program::load(&populated_source(), &device, &stage_paths()).unwrap();

        let first = program.uniform_location(&device, "u_color");
        let second = program.uniform_location(&device, "u_color");
        assert_eq!(first, second);
        assert!(first.is_some());
        // The device saw exactly one query despite two lookups.
        assert_eq!(device.location_queries(), 1);

        // Distinct names are distinct queries.
        program.uniform_location(&device, "u_model");
        assert_eq!(device.location_queries(), 2);
    }
}
