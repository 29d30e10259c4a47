use std::sync::Arc;

use image::RgbaImage;

use crate::assets::decode::decode_image;
use crate::foundation::error::{MemeError, MemeResult, ValueKind};
use crate::template::model::Template;

/// A caller-supplied value before decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawInput {
    /// Encoded image bytes (PNG, JPEG, GIF, ...).
    Image(Vec<u8>),
    /// Text value.
    Text(String),
}

impl RawInput {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Image(_) => ValueKind::Image,
            Self::Text(_) => ValueKind::Text,
        }
    }
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for RawInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Image(bytes)
    }
}

/// A decoded, type-checked input.
#[derive(Clone, Debug)]
pub enum BoundInput {
    Image(Arc<RgbaImage>),
    Text(String),
}

impl BoundInput {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Image(_) => ValueKind::Image,
            Self::Text(_) => ValueKind::Text,
        }
    }
}

/// Inputs for one generation call, in caller order.
#[derive(Clone, Debug, Default)]
pub struct BoundInputs {
    values: Vec<BoundInput>,
}

impl BoundInputs {
    pub fn get(&self, index: usize) -> Option<&BoundInput> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn image(&self, index: usize) -> Option<&Arc<RgbaImage>> {
        match self.values.get(index)? {
            BoundInput::Image(img) => Some(img),
            BoundInput::Text(_) => None,
        }
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        match self.values.get(index)? {
            BoundInput::Text(s) => Some(s),
            BoundInput::Image(_) => None,
        }
    }

    /// Text values only, in order. `$N` markers index into this list.
    pub fn texts(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter_map(|v| match v {
                BoundInput::Text(s) => Some(s.as_str()),
                BoundInput::Image(_) => None,
            })
            .collect()
    }
}

/// Check `raw` against `template.sources` and decode images eagerly.
///
/// A missing input for a declared source is a mismatch at that index. Inputs past the declared
/// sources are decoded by their own kind and stay addressable by explicit `source` indices.
pub fn bind(template: &Template, raw: &[RawInput]) -> MemeResult<BoundInputs> {
    for (index, slot) in template.sources.iter().enumerate() {
        match raw.get(index) {
            Some(input) if input.kind() == slot.kind => {}
            _ => {
                return Err(MemeError::UnmatchedInputType {
                    index,
                    expected: slot.kind,
                });
            }
        }
    }

    let mut values = Vec::with_capacity(raw.len());
    for (index, input) in raw.iter().enumerate() {
        values.push(match input {
            RawInput::Image(bytes) => {
                let img = decode_image(bytes).map_err(|e| match e {
                    MemeError::Decode(msg) => MemeError::decode(format!("input {index}: {msg}")),
                    other => other,
                })?;
                BoundInput::Image(Arc::new(img))
            }
            RawInput::Text(s) => BoundInput::Text(s.clone()),
        });
    }
    tracing::debug!(inputs = values.len(), "bound inputs");
    Ok(BoundInputs { values })
}

#[cfg(test)]
#[path = "../../tests/unit/bind/bind.rs"]
mod tests;
