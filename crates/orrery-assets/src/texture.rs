//! Texture decoding via `image`.

use std::path::Path;

use crate::error::AssetLoadError;

/// Decoded RGBA8 pixels, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// A 1x1 opaque white texture, bound while a real texture is loading.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }
}

/// Decode a PNG or JPEG file into RGBA8.
pub fn load_texture(path: &Path) -> Result<TextureData, AssetLoadError> {
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(source) => AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => AssetLoadError::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::info!("Loaded texture {} ({width}x{height})", path.display());
    Ok(TextureData {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
