use image::{Rgba, RgbaImage};
use kurbo::{Affine, Point, Rect};

use crate::transform::sample::{bilinear, to_straight};

/// Result of rotating a raster onto an expanded canvas.
#[derive(Clone, Debug)]
pub struct Rotated {
    pub image: RgbaImage,
    /// Where the expanded canvas' top-left sits relative to the unrotated raster's top-left,
    /// for the pivot to stay put.
    pub shift: (f64, f64),
}

/// Rotate counter-clockwise by `angle_deg` about `pivot` (defaults to the raster center),
/// growing the canvas to the rotated bounding box.
pub fn rotate_expand(img: &RgbaImage, angle_deg: f64, pivot: Option<(f64, f64)>) -> Rotated {
    let (w, h) = (f64::from(img.width()), f64::from(img.height()));
    let pivot = pivot.map_or(Point::new(w / 2.0, h / 2.0), |(x, y)| Point::new(x, y));
    // Image space is y-down, so a visual counter-clockwise turn is a negative kurbo angle.
    let fwd = Affine::rotate_about(-angle_deg.to_radians(), pivot);

    let bbox = fwd.transform_rect_bbox(Rect::new(0.0, 0.0, w, h));
    // Snap away float noise so 90 degree turns keep exact dimensions.
    let snap = |v: f64| (v * 1e6).round() / 1e6;
    let (x0, y0) = (snap(bbox.x0).floor(), snap(bbox.y0).floor());
    let (x1, y1) = (snap(bbox.x1).ceil(), snap(bbox.y1).ceil());
    let out_w = ((x1 - x0) as u32).max(1);
    let out_h = ((y1 - y0) as u32).max(1);

    let inv = fwd.inverse();
    let image = RgbaImage::from_fn(out_w, out_h, |u, v| {
        let p = inv * Point::new(f64::from(u) + 0.5 + x0, f64::from(v) + 0.5 + y0);
        Rgba(to_straight(bilinear(img, p.x, p.y)))
    });

    Rotated {
        image,
        shift: (x0, y0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/rotate.rs"]
mod tests;
