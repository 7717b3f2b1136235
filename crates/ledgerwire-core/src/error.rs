//! Error types for the ledgerwire codec.

use thiserror::Error;

/// Errors raised by the definitions table, header codec, object codec and
/// signing-blob constructors.
///
/// Variants fall in two groups. Caller bugs (`UnknownField`, `MissingField`,
/// `TypeMismatch`, ...) mean the input tree itself is wrong. Malformed input
/// (`MalformedHeader`, `TruncatedInput`, ...) means untrusted bytes are corrupt;
/// see [`CodecError::is_malformed_input`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unknown type {type_name} (field {field})")]
    UnknownType { field: String, type_name: String },

    #[error("no field for header type_code={type_code} field_code={field_code} at offset {offset}")]
    UnknownHeader {
        type_code: u16,
        field_code: u16,
        offset: usize,
    },

    #[error("malformed field header {input:?}: {reason}")]
    MalformedHeader { input: String, reason: &'static str },

    #[error("truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{remaining} trailing bytes after offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    #[error("value of {length} bytes exceeds the variable-length ceiling of {max}")]
    ValueTooLarge { length: usize, max: usize },

    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("field {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("field {field}: type {type_name} has no value kind")]
    UnsupportedType { field: String, type_name: String },

    #[error("non-canonical encoding at offset {offset}: {reason}")]
    NonCanonical { offset: usize, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("definitions table: {0}")]
    Definitions(String),
}

impl CodecError {
    /// True when the error describes corrupt wire bytes rather than a bad
    /// request from the caller.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CodecError::UnknownHeader { .. }
                | CodecError::MalformedHeader { .. }
                | CodecError::TruncatedInput { .. }
                | CodecError::TrailingBytes { .. }
                | CodecError::NonCanonical { .. }
                | CodecError::InvalidHex(_)
        )
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
