//! Error types for the transaction codecs.
//!
//! Every conversion that can fail returns a [`CodecError`]. Each variant
//! belongs to exactly one pipeline [`Stage`], so callers can report where an
//! encode or decode run stopped without inspecting the message text.

use std::fmt;

use serde_json::error::Category;
use thiserror::Error;

/// A step of the encode/decode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading the input source.
    Read,
    /// Parsing or rendering the JSON form.
    Json,
    /// Parsing the canonical binary form.
    Binary,
    /// Unwrapping the text envelope.
    Envelope,
    /// Assembling a transaction through the builder.
    Build,
    /// Rendering the display-only form.
    Display,
    /// Emitting the result to the output sink.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Json => write!(f, "json"),
            Self::Binary => write!(f, "binary"),
            Self::Envelope => write!(f, "envelope"),
            Self::Build => write!(f, "build"),
            Self::Display => write!(f, "display"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Errors produced by the codecs, the builder, and the pipeline.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input is not syntactically valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// The JSON parses but does not describe a valid transaction.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The byte sequence is not a structurally valid canonical transaction.
    #[error("malformed binary at byte {offset} ({field}): {reason}")]
    MalformedBinary {
        /// Offset at which parsing stopped.
        offset: usize,
        /// Dotted path of the field being read, e.g. `auth_info.fee.gas_limit`.
        field: String,
        /// What was wrong.
        reason: String,
    },

    /// The text envelope could not be unwrapped.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// The builder was given values that violate transaction invariants.
    #[error("invalid transaction: {0}")]
    Construction(String),

    /// Rendering a transaction failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The requested output form is not available in this codec set.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The input source holds more bytes than the configured limit.
    #[error("input exceeds the {limit}-byte transaction limit")]
    InputTooLarge {
        /// The configured `max_tx_bytes`.
        limit: usize,
    },

    /// The run was cancelled before the given stage started.
    #[error("cancelled before the {stage} stage")]
    Cancelled {
        /// The stage that did not run.
        stage: Stage,
    },

    /// Reading the source or writing the sink failed.
    #[error("I/O error during {stage}: {source}")]
    Io {
        /// `Read` or `Write`.
        stage: Stage,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Returns the pipeline stage this error originated from.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MalformedJson(_) | Self::SchemaMismatch(_) | Self::Serialization(_) => Stage::Json,
            Self::MalformedBinary { .. } => Stage::Binary,
            Self::InvalidEncoding(_) => Stage::Envelope,
            Self::Construction(_) => Stage::Build,
            Self::Unsupported(_) => Stage::Display,
            Self::InputTooLarge { .. } => Stage::Read,
            Self::Cancelled { stage } | Self::Io { stage, .. } => *stage,
        }
    }

    /// Classifies a `serde_json` parse error: syntax and premature EOF are
    /// malformed JSON, anything type- or field-related is a schema mismatch.
    pub fn from_json_error(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Syntax | Category::Eof => Self::MalformedJson(err.to_string()),
            Category::Data => Self::SchemaMismatch(err.to_string()),
            Category::Io => Self::Io {
                stage: Stage::Read,
                source: err.into(),
            },
        }
    }

    pub(crate) fn malformed_binary(
        offset: usize,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedBinary {
            offset,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_is_malformed_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = CodecError::from_json_error(err);
        assert!(matches!(err, CodecError::MalformedJson(_)));
        assert_eq!(err.stage(), Stage::Json);
    }

    #[test]
    fn truncated_json_is_malformed_json() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\": [1, 2").unwrap_err();
        assert!(matches!(
            CodecError::from_json_error(err),
            CodecError::MalformedJson(_)
        ));
    }

    #[test]
    fn type_error_is_schema_mismatch() {
        let err = serde_json::from_str::<Vec<u64>>("{\"a\": 1}").unwrap_err();
        assert!(matches!(
            CodecError::from_json_error(err),
            CodecError::SchemaMismatch(_)
        ));
    }

    #[test]
    fn malformed_binary_message_names_offset_and_field() {
        let err = CodecError::malformed_binary(12, "body.memo", "invalid UTF-8");
        assert_eq!(
            err.to_string(),
            "malformed binary at byte 12 (body.memo): invalid UTF-8"
        );
        assert_eq!(err.stage(), Stage::Binary);
    }

    #[test]
    fn cancelled_reports_its_stage() {
        let err = CodecError::Cancelled {
            stage: Stage::Write,
        };
        assert_eq!(err.stage(), Stage::Write);
        assert_eq!(err.to_string(), "cancelled before the write stage");
    }
}
