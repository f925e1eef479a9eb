//! Runtime materials.
//!
//! A [`Material`] is the per-draw aggregate the render loop consumes: a
//! shared program plus typed uniform bindings. It is built fresh from a
//! resolved [`MaterialAsset`](crate::assets::MaterialAsset) each time it is
//! requested and lives only as long as its caller keeps it — runtime
//! materials are never cached, only the assets they reference are.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3, Vec4};

use crate::assets::{
    Asset, AssetKind, AssetPayload, MaterialAsset, Program, ShaderStage, SharedAsset, Texture,
    UniformSpec,
};
use crate::cache::AssetCache;
use crate::device::{RenderDevice, UniformValue};
use crate::error::AssetError;
use crate::source::AssetSource;

/// An assembled material: program handle plus resolved uniform bindings.
#[derive(Debug)]
pub struct Material {
    program: SharedAsset,
    textures: BTreeMap<String, SharedAsset>,
    scalars: BTreeMap<String, f32>,
    vec3s: BTreeMap<String, Vec3>,
    vec4s: BTreeMap<String, Vec4>,
    mat4s: BTreeMap<String, Mat4>,
}

impl Material {
    /// Create an empty material around a program asset.
    pub fn new(program: SharedAsset) -> Result<Self, AssetError> {
        if program.as_program().is_none() {
            return Err(AssetError::WrongAssetType {
                key: program.path().to_owned(),
                expected: AssetKind::Program,
                actual: program.kind(),
            });
        }
        Ok(Self {
            program,
            textures: BTreeMap::new(),
            scalars: BTreeMap::new(),
            vec3s: BTreeMap::new(),
            vec4s: BTreeMap::new(),
            mat4s: BTreeMap::new(),
        })
    }

    pub fn set_texture(&mut self, name: impl Into<String>, texture: SharedAsset) {
        self.textures.insert(name.into(), texture);
    }

    pub fn set_scalar(&mut self, name: impl Into<String>, value: f32) {
        self.scalars.insert(name.into(), value);
    }

    pub fn set_vec3(&mut self, name: impl Into<String>, value: Vec3) {
        self.vec3s.insert(name.into(), value);
    }

    pub fn set_vec4(&mut self, name: impl Into<String>, value: Vec4) {
        self.vec4s.insert(name.into(), value);
    }

    pub fn set_mat4(&mut self, name: impl Into<String>, value: Mat4) {
        self.mat4s.insert(name.into(), value);
    }

    pub fn program(&self) -> &SharedAsset {
        &self.program
    }

    pub fn texture(&self, name: &str) -> Option<&SharedAsset> {
        self.textures.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.scalars.get(name).copied()
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        self.vec3s.get(name).copied()
    }

    pub fn vec4(&self, name: &str) -> Option<Vec4> {
        self.vec4s.get(name).copied()
    }

    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        self.mat4s.get(name).copied()
    }

    /// Bind the program, its textures, and every uniform on `device`.
    ///
    /// Textures are assigned sequential units in name order and their
    /// sampler uniforms pointed at those units. Uniform names the program
    /// does not expose are skipped.
    pub fn apply(&self, device: &dyn RenderDevice) {
        let Some(program) = self.program.as_program() else {
            // Material::new refuses non-program assets.
            return;
        };
        device.bind_program(program.handle());

        for (unit, (name, asset)) in self.textures.iter().enumerate() {
            let Some(texture) = asset.as_texture() else {
                continue;
            };
            device.bind_texture(unit as u32, texture.handle());
            self.upload(device, program, name, UniformValue::Int(unit as i32));
        }
        for (name, value) in &self.scalars {
            self.upload(device, program, name, UniformValue::Float(*value));
        }
        for (name, value) in &self.vec3s {
            self.upload(device, program, name, UniformValue::Vec3(*value));
        }
        for (name, value) in &self.vec4s {
            self.upload(device, program, name, UniformValue::Vec4(*value));
        }
        for (name, value) in &self.mat4s {
            self.upload(device, program, name, UniformValue::Mat4(*value));
        }
    }

    fn upload(&self, device: &dyn RenderDevice, program: &Program, name: &str, value: UniformValue) {
        match program.uniform_location(device, name) {
            Some(location) => device.set_uniform(location, value),
            None => log::trace!("program has no uniform {name:?}, skipping"),
        }
    }
}

/// Assemble a [`Material`] from a resolved material asset.
///
/// The program is resolved through the cache keyed by the vertex-stage path,
/// loading every declared stage; texture uniforms are resolved through the
/// cache keyed by their texture paths. Uniform entries become typed bindings
/// by shape.
pub fn build_material(
    cache: &AssetCache,
    source: &dyn AssetSource,
    device: &dyn RenderDevice,
    material: &MaterialAsset,
) -> Result<Material, AssetError> {
    let vertex_path = material
        .shader_paths()
        .get(&ShaderStage::Vertex)
        .ok_or_else(|| AssetError::CompileFailed {
            stage: ShaderStage::Vertex,
            log: "material declares no vertex stage path".into(),
        })?;

    let program = cache.get_or_load(vertex_path, || {
        let program = Program::load(source, device, material.shader_paths())?;
        Ok(Asset::new(
            vertex_path.clone(),
            AssetPayload::Program(program),
        ))
    })?;
    let mut runtime = Material::new(program)?;

    for (name, spec) in material.uniforms() {
        match spec {
            UniformSpec::Scalar(value) => runtime.set_scalar(name, *value),
            UniformSpec::Vec3(value) => runtime.set_vec3(name, Vec3::from_array(*value)),
            UniformSpec::Vec4(value) => runtime.set_vec4(name, Vec4::from_array(*value)),
            UniformSpec::Texture(spec) => {
                let texture = cache.get_or_load(&spec.path, || {
                    let texture = Texture::load(source, device, &spec.path, spec.filter)?;
                    Ok(Asset::new(spec.path.clone(), AssetPayload::Texture(texture)))
                })?;
                if texture.as_texture().is_none() {
                    return Err(AssetError::WrongAssetType {
                        key: spec.path.clone(),
                        expected: AssetKind::Texture,
                        actual: texture.kind(),
                    });
                }
                runtime.set_texture(name, texture);
            }
        }
    }

    Ok(runtime)
}
