//! Render device boundary.
//!
//! The cache never talks to a graphics API directly. Decoding an image or
//! compiling a program produces CPU-side data that is handed to a
//! [`RenderDevice`], which returns opaque handles. Real backends implement
//! this trait over their API of choice; [`NullDevice`] is a headless
//! implementation for tests and offline tools.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use glam::{Mat4, Vec3, Vec4};

use crate::assets::{ShaderStage, TextureData, TextureFilter};
use crate::error::AssetError;

/// Handle to a device texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u64);

impl ProgramHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Resolved binding location of a named uniform within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(i32);

impl UniformLocation {
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

/// A typed value bound into a program uniform at draw time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// Opaque GPU operations the asset core depends on.
///
/// Implementations must be `Send + Sync`; texture creation and program
/// compilation are called from both the render thread (synchronous loads)
/// and the background loader thread.
pub trait RenderDevice: Send + Sync + 'static {
    /// Upload decoded pixel data and return a texture handle.
    fn create_texture(
        &self,
        data: &TextureData,
        filter: TextureFilter,
    ) -> Result<TextureHandle, AssetError>;

    /// Compile and link the given stage sources into a program.
    fn compile_program(
        &self,
        sources: &BTreeMap<ShaderStage, String>,
    ) -> Result<ProgramHandle, AssetError>;

    /// Resolve the binding location of a named uniform, if the program has one.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Make `program` the active program for subsequent uniform uploads.
    fn bind_program(&self, program: ProgramHandle);

    /// Bind `texture` to the given texture unit.
    fn bind_texture(&self, unit: u32, texture: TextureHandle);

    /// Upload a uniform value to a resolved location of the active program.
    fn set_uniform(&self, location: UniformLocation, value: UniformValue);
}

/// Headless device that validates inputs and hands out fresh handles
/// without touching a GPU.
///
/// Used by the test suite and useful for asset-pipeline tooling that wants
/// to exercise loading and resolution without a graphics context.
#[derive(Debug, Default)]
pub struct NullDevice {
    next_handle: AtomicU64,
    location_queries: AtomicUsize,
}

impl NullDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`RenderDevice::uniform_location`] calls made against this
    /// device. Lets tests assert that location lookups are memoized.
    pub fn location_queries(&self) -> usize {
        self.location_queries.load(Ordering::Relaxed)
    }

    fn next(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl RenderDevice for NullDevice {
    fn create_texture(
        &self,
        data: &TextureData,
        _filter: TextureFilter,
    ) -> Result<TextureHandle, AssetError> {
        debug_assert_eq!(
            data.pixels.len(),
            (data.width * data.height * 4) as usize,
            "texture data must be tightly packed RGBA8"
        );
        Ok(TextureHandle::new(self.next()))
    }

    fn compile_program(
        &self,
        sources: &BTreeMap<ShaderStage, String>,
    ) -> Result<ProgramHandle, AssetError> {
        if sources.is_empty() {
            return Err(AssetError::LinkFailed {
                log: "no shader stages provided".into(),
            });
        }
        for (stage, source) in sources {
            if source.trim().is_empty() {
                return Err(AssetError::CompileFailed {
                    stage: *stage,
                    log: "empty shader source".into(),
                });
            }
        }
        Ok(ProgramHandle::new(self.next()))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.location_queries.fetch_add(1, Ordering::Relaxed);
        // Stable per (program, name) so repeated lookups agree.
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        program.hash(&mut hasher);
        name.hash(&mut hasher);
        Some(UniformLocation::new((hasher.finish() & 0x7FFF_FFFF) as i32))
    }

    fn bind_program(&self, _program: ProgramHandle) {}

    fn bind_texture(&self, _unit: u32, _texture: TextureHandle) {}

    fn set_uniform(&self, _location: UniformLocation, _value: UniformValue) {}
}
