use image::RgbaImage;

use crate::foundation::core::{Anchor, Rgba8};
use crate::foundation::error::MemeResult;
use crate::template::model::{Rotation, TextAlign};
use crate::text::layout::{TextBlock, TextLayoutOpts, aligned_origin, compress_to_width, render_block};
use crate::text::shaper::TextShaper;
use crate::transform::rotate::rotate_expand;

/// Everything needed to rasterize and place one text element in one slot.
#[derive(Clone, Debug)]
pub struct TextDraw {
    pub face: String,
    pub color: Rgba8,
    pub align: TextAlign,
    pub block: TextBlock,
    /// Squeeze to this width when wider.
    pub compress_width: Option<u32>,
    pub anchor: Anchor,
    pub rotation: Option<Rotation>,
}

/// Rotate `raster` (top-left at `origin`) and return where the rotated raster goes.
///
/// With an explicit pivot the pivot keeps its frame position. Without one the rotated raster is
/// centered on `anchor`, except for rounded elements, which stay at `origin`.
pub fn rotate_placed(
    raster: &RgbaImage,
    origin: Anchor,
    anchor: Anchor,
    rotation: Rotation,
    rounded: bool,
) -> (RgbaImage, Anchor) {
    let r = rotate_expand(raster, rotation.angle_deg, rotation.center);
    let at = match rotation.center {
        Some(_) => Anchor::new(
            origin.x + r.shift.0.round() as i32,
            origin.y + r.shift.1.round() as i32,
        ),
        None if rounded => origin,
        None => Anchor::new(
            anchor.x - (r.image.width() / 2) as i32,
            anchor.y - (r.image.height() / 2) as i32,
        ),
    };
    (r.image, at)
}

pub fn render_text(
    shaper: &mut dyn TextShaper,
    draw: &TextDraw,
    opts: &TextLayoutOpts,
) -> MemeResult<(RgbaImage, Anchor)> {
    let mut raster = render_block(
        shaper,
        &draw.face,
        &draw.block,
        draw.color,
        draw.align,
        opts.line_spacing_px,
    )?;
    if let Some(w) = draw.compress_width {
        raster = compress_to_width(raster, w);
    }
    let origin = aligned_origin(draw.align, draw.anchor, raster.width(), raster.height());
    Ok(match draw.rotation {
        Some(rot) => rotate_placed(&raster, origin, draw.anchor, rot, false),
        None => (raster, origin),
    })
}
