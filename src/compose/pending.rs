use std::sync::Arc;

use image::RgbaImage;

use crate::compose::layers::LayerStack;
use crate::compose::place::{TextDraw, render_text};
use crate::foundation::core::Anchor;
use crate::foundation::error::MemeResult;
use crate::text::layout::TextLayoutOpts;
use crate::text::shaper::TextShaper;

/// A foreground paste held back until every background layer is settled.
#[derive(Clone, Debug)]
pub enum PendingPaste {
    /// Paste an already prepared raster.
    Image {
        slot: usize,
        raster: Arc<RgbaImage>,
        at: Anchor,
    },
    /// Draw a laid-out text block.
    Text { slot: usize, draw: Arc<TextDraw> },
}

impl PendingPaste {
    pub fn slot(&self) -> usize {
        match self {
            Self::Image { slot, .. } | Self::Text { slot, .. } => *slot,
        }
    }
}

/// Foreground pastes in recording order.
#[derive(Clone, Debug, Default)]
pub struct PendingQueue {
    items: Vec<PendingPaste>,
}

impl PendingQueue {
    pub fn push(&mut self, paste: PendingPaste) {
        self.items.push(paste);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Apply every recorded paste, oldest first.
    pub fn flush(
        self,
        layers: &mut LayerStack,
        shaper: &mut dyn TextShaper,
        opts: &TextLayoutOpts,
    ) -> MemeResult<()> {
        for item in self.items {
            tracing::debug!(slot = item.slot(), "flushing foreground paste");
            match item {
                PendingPaste::Image { slot, raster, at } => {
                    layers.paste_background(slot, &raster, at);
                }
                PendingPaste::Text { slot, draw } => {
                    let (raster, at) = render_text(shaper, &draw, opts)?;
                    layers.paste_background(slot, &raster, at);
                }
            }
        }
        Ok(())
    }
}
