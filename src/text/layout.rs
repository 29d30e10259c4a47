use image::RgbaImage;

use crate::compose::blend::paste_over;
use crate::foundation::core::{Anchor, Rgba8, Size};
use crate::foundation::error::{MemeError, MemeResult};
use crate::template::model::{FontSize, FontSpec, TextAlign, TextOverflow};
use crate::text::shaper::{TextExtent, TextShaper};
use crate::transform::resize::resize_exact;

/// Knobs for text fitting and block layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextLayoutOpts {
    /// Hard cap on auto-fit search steps.
    pub fit_iteration_cap: usize,
    /// Vertical gap between consecutive lines.
    pub line_spacing_px: f32,
}

impl Default for TextLayoutOpts {
    fn default() -> Self {
        Self {
            fit_iteration_cap: 1024,
            line_spacing_px: 4.0,
        }
    }
}

/// Text broken into lines at a chosen size, with per-line and block extents.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub size_px: f32,
    pub lines: Vec<String>,
    pub line_extents: Vec<TextExtent>,
    pub extent: TextExtent,
}

/// Split on explicit line breaks, tolerating `\r\n`.
pub fn hard_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

/// Measure each line and the stacked block (widest line, heights plus spacing between lines).
pub fn measure_block(
    shaper: &mut dyn TextShaper,
    face: &str,
    lines: &[String],
    size_px: f32,
    line_spacing_px: f32,
) -> MemeResult<(Vec<TextExtent>, TextExtent)> {
    let mut extents = Vec::with_capacity(lines.len());
    let mut block = TextExtent::default();
    for (i, line) in lines.iter().enumerate() {
        let e = shaper.measure_line(face, line, size_px)?;
        block.width = block.width.max(e.width);
        block.height += e.height;
        if i > 0 {
            block.height += line_spacing_px;
        }
        extents.push(e);
    }
    Ok((extents, block))
}

/// Greedy per-character wrap: a line grows until the next character would push its rendered
/// width past `max_width`. Explicit `\n` always breaks. A single character wider than
/// `max_width` still gets its own line.
pub fn wrap_lines(
    shaper: &mut dyn TextShaper,
    face: &str,
    text: &str,
    size_px: f32,
    max_width: f32,
) -> MemeResult<Vec<String>> {
    let mut out = Vec::new();
    for hard in hard_lines(text) {
        let mut current = String::new();
        for ch in hard.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            let width = shaper.measure_line(face, &candidate, size_px)?.width;
            if width > max_width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = candidate;
            }
        }
        out.push(current);
    }
    Ok(out)
}

/// Largest size in `[min, max]` reachable from `min` in steps of `max(1, max / 100)` whose
/// block still fits `bounds`. Returns `min` when even `min` overflows.
pub fn fit_font_size(
    shaper: &mut dyn TextShaper,
    face: &str,
    text: &str,
    min: f32,
    max: f32,
    bounds: Size,
    opts: &TextLayoutOpts,
) -> MemeResult<f32> {
    let lines = hard_lines(text);
    let step = (max / 100.0).max(1.0);
    let (bw, bh) = (bounds.width as f32, bounds.height as f32);

    let mut size = min;
    for _ in 0..opts.fit_iteration_cap {
        let next = size + step;
        if next > max {
            break;
        }
        let (_, block) = measure_block(shaper, face, &lines, next, opts.line_spacing_px)?;
        if !block.fits(bw, bh) {
            break;
        }
        size = next;
    }
    Ok(size)
}

/// Pick the size, break lines and enforce `max_lines` for one text position.
pub fn layout_text(
    shaper: &mut dyn TextShaper,
    position: usize,
    font: &FontSpec,
    text: &str,
    bounds: Size,
    opts: &TextLayoutOpts,
) -> MemeResult<TextBlock> {
    let (size_px, grew) = match font.size {
        FontSize::Fixed(s) => (s, false),
        FontSize::AutoFit { min, max } => {
            let s = fit_font_size(shaper, &font.face, text, min, max, bounds, opts)?;
            (s, s != min)
        }
    };

    // A size that grew past `min` already fits the box unwrapped.
    let lines = if font.multiline && font.overflow == TextOverflow::Wrap && !grew {
        wrap_lines(shaper, &font.face, text, size_px, bounds.width as f32)?
    } else {
        hard_lines(text)
    };

    if let Some(max) = font.max_lines
        && lines.len() > max as usize
    {
        return Err(MemeError::LineCountExceeded {
            position,
            lines: lines.len(),
            max,
        });
    }

    let (line_extents, extent) =
        measure_block(shaper, &font.face, &lines, size_px, opts.line_spacing_px)?;
    Ok(TextBlock {
        size_px,
        lines,
        line_extents,
        extent,
    })
}

/// Rasterize a laid-out block; each line is aligned inside the block per `align`.
pub fn render_block(
    shaper: &mut dyn TextShaper,
    face: &str,
    block: &TextBlock,
    color: Rgba8,
    align: TextAlign,
    line_spacing_px: f32,
) -> MemeResult<RgbaImage> {
    let w = block.extent.width.ceil().max(1.0) as u32;
    let h = block.extent.height.ceil().max(1.0) as u32;
    let mut canvas = RgbaImage::new(w, h);

    let mut y = 0.0f32;
    for (line, extent) in block.lines.iter().zip(&block.line_extents) {
        if !line.is_empty() {
            let img = shaper.draw_line(face, line, block.size_px, color)?;
            let x = match align {
                TextAlign::Left => 0,
                TextAlign::Center => (w as i32 - img.width() as i32) / 2,
                TextAlign::Right => w as i32 - img.width() as i32,
            };
            paste_over(&mut canvas, &img, Anchor::new(x, y.round() as i32));
        }
        y += extent.height + line_spacing_px;
    }
    Ok(canvas)
}

/// Squeeze a raster horizontally to `max_width` when it is wider.
pub fn compress_to_width(img: RgbaImage, max_width: u32) -> RgbaImage {
    if img.width() <= max_width || max_width == 0 {
        return img;
    }
    resize_exact(&img, Size::new(max_width, img.height()))
}

/// Top-left corner of a `w`x`h` block placed at `anchor` with `align`.
pub fn aligned_origin(align: TextAlign, anchor: Anchor, w: u32, h: u32) -> Anchor {
    match align {
        TextAlign::Left => anchor,
        TextAlign::Center => Anchor::new(anchor.x - (w / 2) as i32, anchor.y - (h / 2) as i32),
        TextAlign::Right => Anchor::new(anchor.x - w as i32, anchor.y),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
