use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{MemeError, MemeResult};

/// Decode encoded image bytes (PNG, JPEG, GIF first frame, ...) into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> MemeResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| MemeError::decode(format!("decode image from memory: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Read and decode an image file.
pub fn open_image(path: &Path) -> MemeResult<RgbaImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image bytes from '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| match e {
        MemeError::Decode(msg) => MemeError::decode(format!("'{}': {msg}", path.display())),
        other => other,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
