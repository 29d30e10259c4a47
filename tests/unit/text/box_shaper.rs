use image::{Rgba, RgbaImage};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{MemeError, MemeResult};
use crate::text::shaper::{TextExtent, TextShaper};

/// Deterministic shaper: every char is `size / 2` wide, every line is `size` tall.
///
/// Lines are drawn as solid boxes of the text color.
#[derive(Debug, Default)]
pub(crate) struct BoxShaper {
    pub(crate) measured: usize,
}

impl TextShaper for BoxShaper {
    fn measure_line(&mut self, face: &str, text: &str, size_px: f32) -> MemeResult<TextExtent> {
        if face == "missing" {
            return Err(MemeError::font(format!("unknown font face '{face}'")));
        }
        self.measured += 1;
        Ok(TextExtent {
            width: text.chars().count() as f32 * size_px / 2.0,
            height: size_px,
        })
    }

    fn draw_line(
        &mut self,
        face: &str,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> MemeResult<RgbaImage> {
        let e = self.measure_line(face, text, size_px)?;
        Ok(RgbaImage::from_pixel(
            e.width.ceil().max(1.0) as u32,
            e.height.ceil().max(1.0) as u32,
            Rgba([color.r, color.g, color.b, color.a]),
        ))
    }
}
