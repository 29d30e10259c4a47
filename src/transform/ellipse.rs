use image::{GrayImage, Luma, RgbaImage};
use image::imageops::FilterType;

const SUPERSAMPLE: u32 = 3;

/// Anti-aliased mask of the ellipse inscribed in a `w`x`h` box.
///
/// Drawn at 3x resolution and downsampled so the edge gets partial coverage.
pub fn ellipse_mask(w: u32, h: u32) -> GrayImage {
    let (bw, bh) = (w * SUPERSAMPLE, h * SUPERSAMPLE);
    let (rx, ry) = (f64::from(bw) / 2.0, f64::from(bh) / 2.0);
    let big = GrayImage::from_fn(bw, bh, |x, y| {
        let nx = (f64::from(x) + 0.5 - rx) / rx;
        let ny = (f64::from(y) + 0.5 - ry) / ry;
        if nx * nx + ny * ny <= 1.0 {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    image::imageops::resize(&big, w, h, FilterType::Lanczos3)
}

/// Clip to the inscribed ellipse. The mask becomes the alpha channel.
pub fn round_to_ellipse(img: &RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }
    let mask = ellipse_mask(w, h);
    let mut out = img.clone();
    for (px, m) in out.pixels_mut().zip(mask.pixels()) {
        px.0[3] = m.0[0];
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transform/ellipse.rs"]
mod tests;
