use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::core::Size;

/// Resize to exactly `size` (aspect ratio not preserved).
pub fn resize_exact(img: &RgbaImage, size: Size) -> RgbaImage {
    if img.dimensions() == (size.width, size.height) {
        return img.clone();
    }
    image::imageops::resize(img, size.width, size.height, FilterType::CatmullRom)
}
