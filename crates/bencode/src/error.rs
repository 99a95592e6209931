//! Error types for bencode decoding, encoding and record binding.

use std::io;

use thiserror::Error;

use crate::bind::FieldPath;
use crate::model::ValueKind;

/// Error during decoding.
///
/// Syntax errors carry the 0-based byte offset of the offending byte, or of
/// the end of input when the input ran out.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset} while reading {context}")]
    UnexpectedEof { offset: u64, context: &'static str },

    #[error("invalid character {ch:?} at offset {offset} while reading {context}, expected a digit", ch = char::from(*.found))]
    InvalidDigit {
        offset: u64,
        found: u8,
        context: &'static str,
    },

    #[error("invalid tag {ch:?} at offset {offset}, expected a digit or one of 'i', 'l', 'd'", ch = char::from(*.found))]
    InvalidTag { offset: u64, found: u8 },

    #[error("{context} at offset {offset} does not fit in 64 bits")]
    IntegerOverflow { offset: u64, context: &'static str },

    #[error("byte string length {len} at offset {offset} exceeds maximum {max}")]
    LengthExceedsLimit { offset: u64, len: u64, max: u64 },

    #[error("nesting depth exceeds maximum {max} at offset {offset}")]
    DepthExceeded { offset: u64, max: usize },

    #[error("trailing data at offset {offset} after a complete value")]
    TrailingData { offset: u64 },

    #[error("read failed at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl DecodeError {
    /// Returns the byte offset the error was raised at.
    pub fn offset(&self) -> u64 {
        match self {
            DecodeError::UnexpectedEof { offset, .. }
            | DecodeError::InvalidDigit { offset, .. }
            | DecodeError::InvalidTag { offset, .. }
            | DecodeError::IntegerOverflow { offset, .. }
            | DecodeError::LengthExceedsLimit { offset, .. }
            | DecodeError::DepthExceeded { offset, .. }
            | DecodeError::TrailingData { offset }
            | DecodeError::Io { offset, .. } => *offset,
        }
    }
}

/// Error during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("write failed after {offset} bytes: {source}")]
    WriteFailure {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("type {kind} has no bencode representation")]
    UnsupportedType { kind: &'static str },

    #[error("integer {value} does not fit in a signed 64-bit bencode integer")]
    IntegerOutOfRange { value: u64 },
}

/// Error while binding a value tree into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("missing key {key:?} for field '{field}' at {path}")]
    MissingKey {
        field: &'static str,
        key: String,
        path: FieldPath,
    },

    #[error("type mismatch at {path}: expected {expected}, got {got}")]
    TypeMismatch {
        expected: ValueKind,
        got: ValueKind,
        path: FieldPath,
    },

    #[error("type {kind} at {path} has no bencode representation")]
    UnsupportedType { kind: &'static str, path: FieldPath },

    #[error("integer {value} at {path} is out of range for {target}")]
    IntegerOutOfRange {
        value: i64,
        target: &'static str,
        path: FieldPath,
    },

    #[error("invalid UTF-8 at {path}")]
    InvalidUtf8 { path: FieldPath },
}

impl BindError {
    /// Returns the location in the record the error was raised at.
    pub fn path(&self) -> &FieldPath {
        match self {
            BindError::MissingKey { path, .. }
            | BindError::TypeMismatch { path, .. }
            | BindError::UnsupportedType { path, .. }
            | BindError::IntegerOutOfRange { path, .. }
            | BindError::InvalidUtf8 { path } => path,
        }
    }
}

/// Any error raised by the combined decode-and-bind or encode entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
