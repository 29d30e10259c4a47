use std::sync::Arc;

use image::RgbaImage;

use crate::bind::BoundInputs;
use crate::compose::layers::LayerStack;
use crate::compose::pending::{PendingPaste, PendingQueue};
use crate::compose::place::{TextDraw, render_text, rotate_placed};
use crate::foundation::core::Anchor;
use crate::foundation::error::{MemeError, MemeResult, ValueKind};
use crate::template::model::{
    FrameDef, ImagePosition, Position, RenderLayer, TextOverflow, TextPosition,
};
use crate::template::registry::TemplateEntry;
use crate::text::layout::{TextLayoutOpts, layout_text};
use crate::text::shaper::TextShaper;
use crate::text::substitute::substitute;
use crate::transform::ellipse::round_to_ellipse;
use crate::transform::perspective::warp_to_quad;
use crate::transform::resize::resize_exact;

/// Compositor knobs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComposeOpts {
    pub text: TextLayoutOpts,
}

/// Output slot mapping for base frames.
struct SlotMap {
    sequence: Option<Vec<usize>>,
}

impl SlotMap {
    /// Slots a base frame paints into. Without a sequence this is the frame index itself.
    fn slots_for(&self, frame_index: usize) -> Vec<usize> {
        match &self.sequence {
            Some(seq) => seq
                .iter()
                .enumerate()
                .filter(|&(_, &base)| base == frame_index)
                .map(|(slot, _)| slot)
                .collect(),
            None => vec![frame_index],
        }
    }
}

/// Per-call composition state.
struct Composer<'a, 's> {
    inputs: &'a BoundInputs,
    texts: Vec<&'a str>,
    shaper: &'s mut dyn TextShaper,
    opts: &'a ComposeOpts,
    slots: SlotMap,
    layers: LayerStack,
    pending: PendingQueue,
}

/// Produce every output frame for `entry` with `inputs`.
///
/// Background-targeted positions paste as they are visited. The pre-authored frame assets are
/// merged next, and foreground-targeted positions are applied last in recording order.
pub fn compose(
    entry: &TemplateEntry,
    inputs: &BoundInputs,
    shaper: &mut dyn TextShaper,
    opts: &ComposeOpts,
) -> MemeResult<Vec<RgbaImage>> {
    let template = entry.template();
    let mut layers = LayerStack::new(template.output_size, template.background_color);

    let base: Vec<usize> = match &template.custom_sequence {
        Some(seq) => seq.clone(),
        None => (0..entry.base_frame_count()).collect(),
    };
    for &frame in &base {
        layers.push_slot(entry.frames().get(frame));
    }

    let mut c = Composer {
        inputs,
        texts: inputs.texts(),
        shaper,
        opts,
        slots: SlotMap {
            sequence: template.custom_sequence.clone(),
        },
        layers,
        pending: PendingQueue::default(),
    };

    for (index, position) in template.positions.iter().enumerate() {
        tracing::debug!(
            position = index,
            kind = %position.kind(),
            layer = ?position.layer(),
            "compositing position"
        );
        let source = position.source_index(index);
        match position {
            Position::Image(p) => c.image_position(index, source, p)?,
            Position::Text(p) => c.text_position(index, source, p)?,
        }
    }

    let Composer {
        shaper,
        opts,
        mut layers,
        pending,
        ..
    } = c;
    layers.merge_foregrounds();
    tracing::debug!(pending = pending.len(), "applying foreground pastes");
    pending.flush(&mut layers, shaper, &opts.text)?;

    Ok(layers.into_frames())
}

impl Composer<'_, '_> {
    fn image_position(&mut self, index: usize, source: usize, p: &ImagePosition) -> MemeResult<()> {
        let src = self
            .inputs
            .image(source)
            .ok_or(MemeError::UnmatchedPositionType {
                position: index,
                kind: ValueKind::Image,
            })?;
        let src: Arc<RgbaImage> = if p.rounded {
            Arc::new(round_to_ellipse(src))
        } else {
            Arc::clone(src)
        };

        for frame in &p.frames {
            let Some(size) = frame.size else {
                continue;
            };
            let mut raster = resize_exact(&src, size);
            let mut origin = frame.anchor();
            if let Some(quad) = &p.perspective {
                let (warped, (dx, dy)) = warp_to_quad(&raster, quad)?;
                raster = warped;
                origin = Anchor::new(origin.x + dx, origin.y + dy);
            }
            if let Some(rot) = frame.rotation {
                (raster, origin) = rotate_placed(&raster, origin, frame.anchor(), rot, p.rounded);
            }

            let raster = Arc::new(raster);
            for slot in self.slots_for(frame) {
                match p.target {
                    RenderLayer::Background => self.layers.paste_background(slot, &raster, origin),
                    RenderLayer::Foreground => self.pending.push(PendingPaste::Image {
                        slot,
                        raster: Arc::clone(&raster),
                        at: origin,
                    }),
                }
            }
        }
        Ok(())
    }

    fn text_position(&mut self, index: usize, source: usize, p: &TextPosition) -> MemeResult<()> {
        let content = if p.readonly {
            let literal = p.content.as_deref().unwrap_or_default();
            substitute(literal, &self.texts, index)?
        } else {
            self.inputs
                .text(source)
                .ok_or(MemeError::UnmatchedPositionType {
                    position: index,
                    kind: ValueKind::Text,
                })?
                .to_string()
        };

        for frame in &p.frames {
            let Some(size) = frame.size else {
                continue;
            };
            let block = layout_text(
                &mut *self.shaper,
                index,
                &p.font,
                &content,
                size,
                &self.opts.text,
            )?;
            let draw = Arc::new(TextDraw {
                face: p.font.face.clone(),
                color: p.font.color,
                align: p.font.align,
                block,
                compress_width: (p.font.overflow == TextOverflow::Compress).then_some(size.width),
                anchor: frame.anchor(),
                rotation: frame.rotation,
            });

            let slots = self.slots_for(frame);
            match p.target {
                RenderLayer::Background => {
                    if slots.is_empty() {
                        continue;
                    }
                    let (raster, at) = render_text(&mut *self.shaper, &draw, &self.opts.text)?;
                    for slot in slots {
                        self.layers.paste_background(slot, &raster, at);
                    }
                }
                RenderLayer::Foreground => {
                    for slot in slots {
                        self.pending.push(PendingPaste::Text {
                            slot,
                            draw: Arc::clone(&draw),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn slots_for(&mut self, frame: &FrameDef) -> Vec<usize> {
        let slots = self.slots.slots_for(frame.frame_index);
        if let Some(&max) = slots.iter().max() {
            self.layers.ensure_capacity(max + 1);
        }
        slots
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
