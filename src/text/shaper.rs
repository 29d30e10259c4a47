use image::RgbaImage;

use crate::foundation::core::Rgba8;
use crate::foundation::error::MemeResult;

/// Measured single-line box in pixels, including descent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

impl TextExtent {
    pub fn fits(self, width: f32, height: f32) -> bool {
        self.width <= width && self.height <= height
    }
}

/// Font source contract used by the compositor.
///
/// Shapers only deal with single lines; wrapping, block measurement and alignment live in
/// [`crate::text::layout`].
pub trait TextShaper {
    /// Measure `text` set in `face` at `size_px`.
    fn measure_line(&mut self, face: &str, text: &str, size_px: f32) -> MemeResult<TextExtent>;

    /// Rasterize `text` onto a transparent canvas of (at least) its measured extent.
    fn draw_line(
        &mut self,
        face: &str,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> MemeResult<RgbaImage>;
}
