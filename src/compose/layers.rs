use image::RgbaImage;

use crate::compose::blend::{over_layer, paste_over};
use crate::foundation::core::{Anchor, Rgba8, Size};

/// Background and foreground rasters per output slot.
///
/// Growth only happens through [`LayerStack::ensure_capacity`]; every indexed write calls it
/// first.
#[derive(Clone, Debug)]
pub struct LayerStack {
    size: Size,
    background_color: Rgba8,
    backgrounds: Vec<RgbaImage>,
    foregrounds: Vec<RgbaImage>,
}

impl LayerStack {
    pub fn new(size: Size, background_color: Rgba8) -> Self {
        Self {
            size,
            background_color,
            backgrounds: Vec::new(),
            foregrounds: Vec::new(),
        }
    }

    /// Append one slot: a filled background and `asset` (or nothing) as its foreground.
    pub fn push_slot(&mut self, asset: Option<&RgbaImage>) {
        self.backgrounds.push(self.blank_background());
        let mut fg = RgbaImage::new(self.size.width, self.size.height);
        if let Some(asset) = asset {
            paste_over(&mut fg, asset, Anchor::default());
        }
        self.foregrounds.push(fg);
    }

    /// Grow to at least `slots` slots; new slots have no foreground asset.
    pub fn ensure_capacity(&mut self, slots: usize) {
        while self.backgrounds.len() < slots {
            self.push_slot(None);
        }
    }

    pub fn paste_background(&mut self, slot: usize, src: &RgbaImage, at: Anchor) {
        self.ensure_capacity(slot + 1);
        paste_over(&mut self.backgrounds[slot], src, at);
    }

    /// Composite every foreground layer onto its background.
    pub fn merge_foregrounds(&mut self) {
        for (bg, fg) in self.backgrounds.iter_mut().zip(&self.foregrounds) {
            over_layer(bg, fg);
        }
    }

    pub fn into_frames(self) -> Vec<RgbaImage> {
        self.backgrounds
    }

    fn blank_background(&self) -> RgbaImage {
        RgbaImage::from_pixel(
            self.size.width,
            self.size.height,
            self.background_color.to_pixel(),
        )
    }
}
