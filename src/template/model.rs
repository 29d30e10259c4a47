use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::core::{Anchor, Rgba8, Size};
use crate::foundation::error::{MemeError, MemeResult, ValueKind};

/// A declarative generation recipe: canvas, timing, input slots and positioned elements.
///
/// Templates are immutable once loaded. They are JSON documents (see the crate README for the
/// schema) and are shared read-only across concurrent generation calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    /// Stable template identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(rename = "name", default)]
    pub display_name: String,
    /// Still or animated output.
    #[serde(rename = "type")]
    pub output_kind: OutputKind,
    /// Per-frame display time in milliseconds (animated output only).
    #[serde(rename = "duration", default)]
    pub frame_duration_ms: Option<f64>,
    /// Fill color of every freshly created background layer.
    #[serde(default = "default_background")]
    pub background_color: Rgba8,
    /// Output frame dimensions.
    pub output_size: Size,
    /// Output slot -> base frame mapping.
    #[serde(
        default,
        deserialize_with = "deserialize_sequence",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_sequence: Option<Vec<usize>>,
    /// Declared input slots, in input order.
    #[serde(default)]
    pub sources: Vec<SourceSlot>,
    /// Elements in paint order (later positions paint over earlier ones within a layer).
    #[serde(default)]
    pub positions: Vec<Position>,
}

fn default_background() -> Rgba8 {
    Rgba8::TRANSPARENT
}

/// Output encoding requested by a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Single still image (PNG).
    Still,
    /// Looping animation (GIF).
    Animated,
    /// Any other declared kind; rejected at generation time.
    Unsupported(String),
}

impl OutputKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Still => "still",
            Self::Animated => "gif",
            Self::Unsupported(s) => s,
        }
    }
}

impl Serialize for OutputKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OutputKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.to_ascii_lowercase().as_str() {
            "gif" | "animated" => Self::Animated,
            "png" | "still" | "image" => Self::Still,
            _ => Self::Unsupported(s),
        })
    }
}

/// One declared input slot.
///
/// The hints are advisory metadata for callers collecting inputs; composition ignores them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceSlot {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default)]
    pub avatar: bool,
    #[serde(default)]
    pub username: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which layer stack a position paints into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderLayer {
    /// Pasted immediately, under the pre-authored frame asset.
    #[default]
    Background,
    /// Deferred until every background layer and frame asset is settled.
    Foreground,
}

/// A visual element placed across one or more frames.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Position {
    /// Pasted raster content.
    Image(ImagePosition),
    /// Rendered text content.
    Text(TextPosition),
}

impl Position {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Image(_) => ValueKind::Image,
            Self::Text(_) => ValueKind::Text,
        }
    }

    pub fn layer(&self) -> RenderLayer {
        match self {
            Self::Image(p) => p.target,
            Self::Text(p) => p.target,
        }
    }

    pub fn frames(&self) -> &[FrameDef] {
        match self {
            Self::Image(p) => &p.frames,
            Self::Text(p) => &p.frames,
        }
    }

    /// Input index this position reads, defaulting to its own ordinal.
    pub fn source_index(&self, ordinal: usize) -> usize {
        let explicit = match self {
            Self::Image(p) => p.source,
            Self::Text(p) => p.source,
        };
        explicit.unwrap_or(ordinal)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImagePosition {
    #[serde(default)]
    pub target: RenderLayer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    /// Clip to the inscribed ellipse.
    #[serde(default)]
    pub rounded: bool,
    /// Destination quad (top-left, top-right, bottom-right, bottom-left).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<[[f64; 2]; 4]>,
    pub frames: Vec<FrameDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextPosition {
    #[serde(default)]
    pub target: RenderLayer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    /// Use `content` instead of a bound input.
    #[serde(default)]
    pub readonly: bool,
    /// Literal content, may contain `$N` markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub font: FontSpec,
    pub frames: Vec<FrameDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FontSpec {
    /// Face name looked up in the font source.
    pub face: String,
    pub size: FontSize,
    #[serde(default)]
    pub color: Rgba8,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    #[serde(default)]
    pub overflow: TextOverflow,
}

/// Font size policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSize {
    /// Always render at this pixel size.
    Fixed(f32),
    /// Search upwards from `min` for the largest size that fits the frame box.
    AutoFit { min: f32, max: f32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Anchor is the block's top-left corner.
    #[default]
    Left,
    /// Anchor is the block's center.
    Center,
    /// Anchor is the block's top-right corner.
    Right,
}

/// What to do with text wider than its frame box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOverflow {
    /// Greedy wrapping against the frame width (only when `multiline` is set).
    #[default]
    Wrap,
    /// Squeeze the rendered line horizontally to the frame width.
    Compress,
}

/// Per-base-frame placement of a position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameDef {
    /// Base frame this placement belongs to.
    #[serde(rename = "id")]
    pub frame_index: usize,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Image: resize target. Text: fit box / wrap width. Absent: not drawn in this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(rename = "rotate", default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

impl FrameDef {
    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.x, self.y)
    }
}

/// Counter-clockwise rotation in degrees, about `center` or the element's own center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rotation {
    pub angle_deg: f64,
    pub center: Option<(f64, f64)>,
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr(Vec<f64>),
            Obj {
                angle_deg: f64,
                #[serde(default)]
                center: Option<(f64, f64)>,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr(v) => match v.as_slice() {
                [angle] => Ok(Self {
                    angle_deg: *angle,
                    center: None,
                }),
                [angle, cx, cy] => Ok(Self {
                    angle_deg: *angle,
                    center: Some((*cx, *cy)),
                }),
                _ => Err(serde::de::Error::custom(
                    "rotate must be [angle] or [angle, center_x, center_y]",
                )),
            },
            Repr::Obj { angle_deg, center } => Ok(Self { angle_deg, center }),
        }
    }
}

fn deserialize_sequence<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<usize>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        List(Vec<usize>),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::List(v)) => Ok(Some(v)),
        Some(Repr::Str(s)) => parse_sequence(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a comma separated frame sequence such as `"2,0,1"`.
pub fn parse_sequence(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| format!("invalid frame index \"{part}\" in custom_sequence"))
        })
        .collect()
}

impl Template {
    /// Parse a template from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MemeResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MemeError::validation(format!("parse template JSON: {e}")))
    }

    /// Parse a template from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MemeError::validation(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate structural invariants. Composition assumes a validated template.
    pub fn validate(&self) -> MemeResult<()> {
        if self.id.trim().is_empty() {
            return Err(MemeError::validation("template id must be non-empty"));
        }
        if self.output_size.is_empty() {
            return Err(MemeError::validation(format!(
                "template '{}' output_size must be > 0",
                self.id
            )));
        }
        if self.output_kind == OutputKind::Animated {
            match self.frame_duration_ms {
                Some(d) if d.is_finite() && d > 0.0 => {}
                _ => {
                    return Err(MemeError::validation(format!(
                        "template '{}' is animated and needs a duration > 0",
                        self.id
                    )));
                }
            }
        }
        if let Some(seq) = &self.custom_sequence
            && seq.is_empty()
        {
            return Err(MemeError::validation(format!(
                "template '{}' custom_sequence must be non-empty when set",
                self.id
            )));
        }

        for (i, position) in self.positions.iter().enumerate() {
            for frame in position.frames() {
                if let Some(size) = frame.size
                    && size.is_empty()
                {
                    return Err(MemeError::validation(format!(
                        "position {i} frame {} size must be > 0",
                        frame.frame_index
                    )));
                }
                if let Some(rot) = frame.rotation
                    && !rot.angle_deg.is_finite()
                {
                    return Err(MemeError::validation(format!(
                        "position {i} frame {} rotation must be finite",
                        frame.frame_index
                    )));
                }
            }
            if let Position::Text(t) = position {
                validate_text_position(i, t)?;
            }
        }
        Ok(())
    }

    /// Number of base frames implied by the positions alone (highest frame id + 1, at least 1).
    pub fn declared_frame_count(&self) -> usize {
        self.positions
            .iter()
            .flat_map(|p| p.frames().iter().map(|f| f.frame_index + 1))
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

fn validate_text_position(i: usize, t: &TextPosition) -> MemeResult<()> {
    if t.readonly && t.content.is_none() {
        return Err(MemeError::validation(format!(
            "position {i} is readonly text without content"
        )));
    }
    if t.font.face.trim().is_empty() {
        return Err(MemeError::validation(format!(
            "position {i} font face must be non-empty"
        )));
    }
    match t.font.size {
        FontSize::Fixed(s) => {
            if !s.is_finite() || s <= 0.0 {
                return Err(MemeError::validation(format!(
                    "position {i} font size must be finite and > 0"
                )));
            }
        }
        FontSize::AutoFit { min, max } => {
            if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
                return Err(MemeError::validation(format!(
                    "position {i} auto-fit range must satisfy 0 < min <= max"
                )));
            }
        }
    }
    if t.font.max_lines == Some(0) {
        return Err(MemeError::validation(format!(
            "position {i} max_lines must be > 0 when set"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
