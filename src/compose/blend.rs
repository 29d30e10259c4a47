use image::{Rgba, RgbaImage};

use crate::foundation::core::Anchor;
use crate::foundation::math::{premul_over_px, premul_px, unpremul_px};

/// Source-over `src` onto `dst` with `src`'s top-left at `at`, clipped to `dst`.
///
/// Both images are straight alpha; blending runs in premultiplied space.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, at: Anchor) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
    let (ox, oy) = (i64::from(at.x), i64::from(at.y));

    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = (ox + sw).min(dw);
    let y1 = (oy + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in y0..y1 {
        for x in x0..x1 {
            let s = src.get_pixel((x - ox) as u32, (y - oy) as u32).0;
            if s[3] == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(x as u32, y as u32);
            if s[3] == 255 {
                *d = Rgba(s);
                continue;
            }
            let out = premul_over_px(premul_px(d.0), premul_px(s));
            *d = Rgba(unpremul_px(out));
        }
    }
}

/// Source-over a whole same-sized layer onto `dst`.
pub fn over_layer(dst: &mut RgbaImage, src: &RgbaImage) {
    paste_over(dst, src, Anchor::default());
}

/// Flatten onto an opaque color, dropping alpha.
pub fn flatten_onto(img: &RgbaImage, bg: [u8; 3]) -> image::RgbImage {
    let bg_px = premul_px([bg[0], bg[1], bg[2], 255]);
    image::RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let out = premul_over_px(bg_px, premul_px(img.get_pixel(x, y).0));
        image::Rgb([out[0], out[1], out[2]])
    })
}
