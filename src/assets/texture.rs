//! Texture assets.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::device::{RenderDevice, TextureHandle};
use crate::error::AssetError;
use crate::source::AssetSource;

/// Sampling mode requested for a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Nearest-neighbor sampling, for pixel art.
    PixelPerfect,
    /// Linear filtering.
    #[default]
    Smooth,
}

impl TextureFilter {
    /// Map a descriptor filter string. `"pixel_perfect"` selects
    /// nearest-neighbor; every other value falls back to smooth.
    pub fn from_name(name: &str) -> Self {
        if name == "pixel_perfect" {
            TextureFilter::PixelPerfect
        } else {
            TextureFilter::Smooth
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureFilter::PixelPerfect => "pixel_perfect",
            TextureFilter::Smooth => "smooth",
        }
    }
}

impl fmt::Display for TextureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TextureFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TextureFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TextureFilter::from_name(&name))
    }
}

/// Decoded CPU-side pixel data, tightly packed RGBA8.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Decode an encoded image (PNG, JPEG, ...) into RGBA8.
    pub fn decode(path: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes).map_err(|e| AssetError::DecodeFailed {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Create a 1x1 solid color texture.
    pub fn solid_color(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: color.to_vec(),
        }
    }

    /// A 1x1 white texture, the conventional fallback binding.
    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255])
    }
}

/// A texture uploaded to the device. Immutable after construction.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
    filter: TextureFilter,
}

impl Texture {
    /// Upload already-decoded pixel data.
    pub fn from_data(
        device: &dyn RenderDevice,
        data: &TextureData,
        filter: TextureFilter,
    ) -> Result<Self, AssetError> {
        let handle = device.create_texture(data, filter)?;
        Ok(Self {
            handle,
            width: data.width,
            height: data.height,
            filter,
        })
    }

    /// Read, decode, and upload the image at `path`.
    pub fn load(
        source: &dyn AssetSource,
        device: &dyn RenderDevice,
        path: &str,
        filter: TextureFilter,
    ) -> Result<Self, AssetError> {
        let bytes = source.read(path)?;
        let data = TextureData::decode(path, &bytes)?;
        log::trace!(
            "decoded texture {path:?} ({}x{}, {})",
            data.width,
            data.height,
            filter
        );
        Self::from_data(device, &data, filter)
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn filter(&self) -> TextureFilter {
        self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::NullDevice;
    use crate::source::MemorySource;

    /// A 1x1 red pixel as a binary PPM, the smallest hand-writable image
    /// the `image` crate decodes out of the box.
    fn tiny_ppm() -> Vec<u8> {
        let mut bytes = b"P6\n1 1\n255\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0x00, 0x00]);
        bytes
    }

    #[test]
    fn filter_name_mapping() {
        assert_eq!(
            TextureFilter::from_name("pixel_perfect"),
            TextureFilter::PixelPerfect
        );
        assert_eq!(TextureFilter::from_name("smooth"), TextureFilter::Smooth);
        // Unknown names fall back to smooth rather than failing.
        assert_eq!(TextureFilter::from_name("anisotropic"), TextureFilter::Smooth);
    }

    #[test]
    fn filter_serde_round_trip() {
        let json = serde_json::to_string(&TextureFilter::PixelPerfect).unwrap();
        assert_eq!(json, "\"pixel_perfect\"");
        let back: TextureFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TextureFilter::PixelPerfect);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = TextureData::decode("bad.png", b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::DecodeFailed { .. }));
    }

    #[test]
    fn decode_ppm_pixel() {
        let data = TextureData::decode("red.ppm", &tiny_ppm()).unwrap();
        assert_eq!((data.width, data.height), (1, 1));
        assert_eq!(data.pixels, vec![0xFF, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn load_through_source() {
        let source = MemorySource::new();
        source.insert("textures/red.ppm", tiny_ppm());
        let device = NullDevice::new();
        let texture = Texture::load(
            &source,
            &device,
            "textures/red.ppm",
            TextureFilter::PixelPerfect,
        )
        .unwrap();
        assert_eq!(texture.size(), (1, 1));
        assert_eq!(texture.filter(), TextureFilter::PixelPerfect);
    }

    #[test]
    fn load_missing_file() {
        let source = MemorySource::new();
        let device = NullDevice::new();
        let err =
            Texture::load(&source, &device, "nope.png", TextureFilter::Smooth).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn solid_color_is_single_pixel() {
        let data = TextureData::white();
        assert_eq!((data.width, data.height), (1, 1));
        assert_eq!(data.pixels.len(), 4);
    }
}
