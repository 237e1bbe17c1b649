//! Error types for field extraction
//!
//! - [`ParseError`]: structurally invalid markup, fatal for the whole parse
//! - [`FieldError`]: a required field is missing or holds the wrong kind

use crate::value::ValueKind;

/// Structural failures while reading answer-set markup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Markup is not well-formed XML
    #[error("syntax error at byte {position}: {message}")]
    Syntax {
        /// Byte offset where the reader stopped
        position: u64,
        /// Reader diagnostic
        message: String,
    },

    /// Start and end tags do not pair up
    #[error("unbalanced markup at byte {position}: {message}")]
    Unbalanced {
        /// Byte offset where the imbalance was detected
        position: u64,
        /// Which tag was left open or closed unexpectedly
        message: String,
    },

    /// Document has no root element
    #[error("document has no root element")]
    MissingRoot,

    /// Content follows the root element
    #[error("content after the root element at byte {position}")]
    TrailingContent {
        /// Byte offset of the extra content
        position: u64,
    },

    /// Input exceeds the configured maximum
    #[error("markup is {size} bytes, maximum is {max}")]
    TooLarge {
        /// Input size in bytes
        size: usize,
        /// Configured limit
        max: usize,
    },
}

impl ParseError {
    /// Create syntax error at position
    pub fn syntax(position: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Create unbalanced-tag error at position
    pub fn unbalanced(position: u64, message: impl Into<String>) -> Self {
        Self::Unbalanced {
            position,
            message: message.into(),
        }
    }

    /// Byte position of the failure, when known
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::Syntax { position, .. }
            | Self::Unbalanced { position, .. }
            | Self::TrailingContent { position } => Some(*position),
            Self::MissingRoot | Self::TooLarge { .. } => None,
        }
    }
}

/// Typed access failures on a field table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// None of the accepted names has a present value
    #[error("required field missing: {field}")]
    Missing {
        /// Field name (first accepted variant)
        field: String,
    },

    /// The field is present but holds another kind of value
    #[error("field '{field}' holds {actual}, expected {expected}")]
    WrongKind {
        /// Field name
        field: String,
        /// Kind the caller asked for
        expected: ValueKind,
        /// Kind actually held
        actual: ValueKind,
    },
}

impl FieldError {
    /// Create missing-field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing { field: field.into() }
    }
}
