use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use image::RgbaImage;

use crate::{
    foundation::core::Rgba8,
    foundation::error::{MemeError, MemeResult},
    foundation::math::unpremul_px,
    text::shaper::{TextExtent, TextShaper},
};

/// Face name -> raw font bytes.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: BTreeMap<String, Arc<Vec<u8>>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `name`, replacing any previous face with that name.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.faces.insert(name.into(), Arc::new(bytes));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Vec<u8>>> {
        self.faces.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.faces.keys().map(String::as_str)
    }

    /// Register every `.ttf`/`.otf`/`.ttc` file in `dir` under its file stem.
    pub fn load_dir(dir: &Path) -> MemeResult<Self> {
        let mut book = Self::new();
        let rd = std::fs::read_dir(dir)
            .with_context(|| format!("read font directory '{}'", dir.display()))?;

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font bytes from '{}'", path.display()))?;
            book.insert(stem, bytes);
        }
        tracing::debug!(faces = book.faces.len(), dir = %dir.display(), "loaded fonts");
        Ok(book)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

struct RegisteredFace {
    family: String,
    font: vello_cpu::peniko::FontData,
}

/// [`TextShaper`] backed by Parley shaping and `vello_cpu` glyph rasterization.
///
/// Holds mutable shaping contexts, so create one per generation call.
pub struct ParleyShaper {
    book: Arc<FontBook>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<String, RegisteredFace>,
}

impl ParleyShaper {
    pub fn new(book: Arc<FontBook>) -> Self {
        Self {
            book,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn register(&mut self, face: &str) -> MemeResult<()> {
        if self.registered.contains_key(face) {
            return Ok(());
        }
        let bytes = self
            .book
            .get(face)
            .cloned()
            .ok_or_else(|| MemeError::font(format!("unknown font face '{face}'")))?;

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MemeError::font(format!("no font families registered from face '{face}'"))
        })?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MemeError::font(format!("font face '{face}' has no family name")))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.to_vec()),
            0,
        );
        self.registered
            .insert(face.to_string(), RegisteredFace { family, font });
        Ok(())
    }

    fn layout(
        &mut self,
        face: &str,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> MemeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MemeError::font("text size_px must be finite and > 0"));
        }
        self.register(face)?;
        let family = self
            .registered
            .get(face)
            .map(|r| r.family.clone())
            .ok_or_else(|| MemeError::font(format!("unknown font face '{face}'")))?;

        // An empty string produces no line box; shape a space to keep the line height.
        let shaped = if text.is_empty() { " " } else { text };
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, shaped, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(shaped);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextShaper for ParleyShaper {
    fn measure_line(&mut self, face: &str, text: &str, size_px: f32) -> MemeResult<TextExtent> {
        let layout = self.layout(face, text, size_px, TextBrushRgba8::default())?;
        let width = if text.is_empty() { 0.0 } else { layout.width() };
        Ok(TextExtent {
            width,
            height: layout.height(),
        })
    }

    fn draw_line(
        &mut self,
        face: &str,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> MemeResult<RgbaImage> {
        let brush = TextBrushRgba8::from(color);
        let layout = self.layout(face, text, size_px, brush)?;
        let w = layout.width().ceil().max(1.0) as u32;
        let h = layout.height().ceil().max(1.0) as u32;
        if text.is_empty() {
            return Ok(RgbaImage::new(1, h));
        }
        let w16: u16 = w
            .try_into()
            .map_err(|_| MemeError::font("text raster width exceeds u16"))?;
        let h16: u16 = h
            .try_into()
            .map_err(|_| MemeError::font("text raster height exceeds u16"))?;

        let font = self
            .registered
            .get(face)
            .map(|r| r.font.clone())
            .ok_or_else(|| MemeError::font(format!("unknown font face '{face}'")))?;

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Positioned glyphs carry the run offset and baseline.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        let mut out = RgbaImage::new(w, h);
        for (dst, src) in out
            .as_mut()
            .chunks_exact_mut(4)
            .zip(pixmap.data_as_u8_slice().chunks_exact(4))
        {
            dst.copy_from_slice(&unpremul_px([src[0], src[1], src[2], src[3]]));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
