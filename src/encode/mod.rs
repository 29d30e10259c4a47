use std::io::Cursor;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, RgbaImage};

use crate::compose::blend::flatten_onto;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{MemeError, MemeResult};
use crate::template::model::{OutputKind, Template};

/// Encoded container format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Png,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Encode composited frames the way `template` asks for.
pub fn encode(frames: &[RgbaImage], template: &Template) -> MemeResult<(OutputFormat, Vec<u8>)> {
    match &template.output_kind {
        OutputKind::Still => Ok((OutputFormat::Png, encode_png(frames, template.background_color)?)),
        OutputKind::Animated => {
            let delay_ms = template.frame_duration_ms.unwrap_or(0.0);
            Ok((OutputFormat::Gif, encode_gif(frames, delay_ms)?))
        }
        OutputKind::Unsupported(kind) => Err(MemeError::UnknownGenerateKind(kind.clone())),
    }
}

/// First frame, flattened onto `background` made opaque, as RGB PNG.
pub fn encode_png(frames: &[RgbaImage], background: Rgba8) -> MemeResult<Vec<u8>> {
    let first = frames
        .first()
        .ok_or_else(|| MemeError::encode("no frames to encode"))?;
    let bg = background.opaque();
    let flat = flatten_onto(first, [bg.r, bg.g, bg.b]);

    let mut out = Cursor::new(Vec::new());
    flat.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| MemeError::encode(format!("png: {e}")))?;
    Ok(out.into_inner())
}

/// Looping GIF with a uniform per-frame delay.
///
/// Each frame fully replaces the previous one; nothing accumulates between frames.
pub fn encode_gif(frames: &[RgbaImage], delay_ms: f64) -> MemeResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(MemeError::encode("no frames to encode"));
    }
    if !delay_ms.is_finite() || delay_ms <= 0.0 {
        return Err(MemeError::encode("gif frame duration must be > 0"));
    }
    let delay = Delay::from_numer_denom_ms(delay_ms.round().max(1.0) as u32, 1);

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| MemeError::encode(format!("gif repeat: {e}")))?;
        for img in frames {
            encoder
                .encode_frame(Frame::from_parts(img.clone(), 0, 0, delay))
                .map_err(|e| MemeError::encode(format!("gif frame: {e}")))?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encode.rs"]
mod tests;
