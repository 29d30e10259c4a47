//! Memeforge is a template-driven image and GIF compositor.
//!
//! A template describes a canvas, its input slots and a list of positioned image and text
//! elements per base frame. Given caller inputs, memeforge composites every output frame and
//! encodes the result as a PNG (still) or a looping GIF (animated).
//!
//! # Pipeline overview
//!
//! 1. **Load**: [`TemplateRegistry::load_dir`] reads `<id>.json` documents and their numbered
//!    frame assets once, up front.
//! 2. **Bind**: [`bind`] checks [`RawInput`]s against the template's declared sources and decodes
//!    images.
//! 3. **Compose**: [`compose`] paints background positions, merges the frame assets, then
//!    applies foreground positions last.
//! 4. **Encode**: [`encode`] writes PNG or GIF bytes in memory.
//!
//! [`Generator`] wires the four steps together and is what most callers want.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO during generation**: templates, assets and fonts are loaded before any call.
//! - **Straight RGBA8** rasters; blending runs in premultiplied space.
#![forbid(unsafe_code)]

mod assets;
mod bind;
mod compose;
mod encode;
mod foundation;
mod generator;
mod template;
mod text;
mod transform;

pub use assets::decode::{decode_image, open_image};
pub use assets::fonts::{FontBook, ParleyShaper, TextBrushRgba8};
pub use bind::{BoundInput, BoundInputs, RawInput, bind};
pub use compose::compositor::{ComposeOpts, compose};
pub use encode::{OutputFormat, encode, encode_gif, encode_png};
pub use foundation::core::{Anchor, Rgba8, Size};
pub use foundation::error::{MemeError, MemeResult, ValueKind};
pub use generator::{GenerateReport, Generated, Generator, GeneratorOpts};
pub use template::model::{
    FontSize, FontSpec, FrameDef, ImagePosition, OutputKind, Position, RenderLayer, Rotation,
    SourceSlot, Template, TextAlign, TextOverflow, TextPosition, parse_sequence,
};
pub use template::registry::{TemplateEntry, TemplateRegistry, load_frame_assets};
pub use text::layout::{TextBlock, TextLayoutOpts, fit_font_size, layout_text, wrap_lines};
pub use text::shaper::{TextExtent, TextShaper};
pub use text::substitute::substitute;
pub use transform::ellipse::round_to_ellipse;
pub use transform::perspective::warp_to_quad;
pub use transform::rotate::{Rotated, rotate_expand};
