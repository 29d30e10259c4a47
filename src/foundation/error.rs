use std::fmt;

/// Convenience result type used across memeforge.
pub type MemeResult<T> = Result<T, MemeError>;

/// Kind of value a source slot or position expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Decoded raster image.
    Image,
    /// Text string.
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Top-level error taxonomy used by generation APIs.
///
/// Every variant is fatal to the current generation call; nothing is retried internally.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// The template id has no frame resource set and no config document.
    #[error("resource not found: template '{0}'")]
    ResourceNotFound(String),

    /// The template id has frame resources but no config document.
    #[error("config not found: template '{0}'")]
    ConfigNotFound(String),

    /// The template declares an output kind the encoder does not support.
    #[error("unknown generate kind '{0}'")]
    UnknownGenerateKind(String),

    /// A runtime input does not match the kind its source slot declares.
    #[error("unmatched input type at index {index}: expected {expected}")]
    UnmatchedInputType {
        /// Offending input index.
        index: usize,
        /// Kind declared by the template source.
        expected: ValueKind,
    },

    /// A position resolved content of the wrong kind, or referenced a missing input.
    #[error("unmatched position type at position {position}: expected {kind}")]
    UnmatchedPositionType {
        /// Offending position index.
        position: usize,
        /// Kind the position requires.
        kind: ValueKind,
    },

    /// Wrapped text needs more lines than the position allows.
    #[error("line count exceeded at position {position}: {lines} lines, max {max}")]
    LineCountExceeded {
        /// Offending position index.
        position: usize,
        /// Lines the layout produced.
        lines: usize,
        /// Declared limit.
        max: u32,
    },

    /// Invalid template or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Corrupt or unsupported image data.
    #[error("decode error: {0}")]
    Decode(String),

    /// Font lookup, shaping or rasterization failures.
    #[error("font error: {0}")]
    Font(String),

    /// Output encoding failures.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Build a [`MemeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MemeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MemeError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`MemeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Stable numeric code used by result descriptors. Success is `1`.
    pub fn code(&self) -> i32 {
        match self {
            Self::ResourceNotFound(_) => -1,
            Self::ConfigNotFound(_) => -2,
            Self::UnknownGenerateKind(_) => -3,
            Self::UnmatchedInputType { .. } | Self::UnmatchedPositionType { .. } => -4,
            Self::LineCountExceeded { .. } => -5,
            _ => -9,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
