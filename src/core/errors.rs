/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::SlotId;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed wire data errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum FormatError {
    #[error("Unknown tag byte {tag:#04x} at offset {offset}")]
    #[diagnostic(
        code(format::unknown_tag),
        help("The stream is not a binary-form document, or it was produced by an incompatible encoder.")
    )]
    UnknownTag { tag: u8, offset: usize },

    #[error("Unknown tag character {tag:?} at offset {offset}")]
    #[diagnostic(
        code(format::unknown_text_tag),
        help("The input is not a textual-form document, or it was produced by an incompatible encoder.")
    )]
    UnknownTextTag { tag: char, offset: usize },

    #[error("Stream truncated at offset {offset}: needed {needed} more byte(s)")]
    #[diagnostic(
        code(format::truncated),
        help("The stream ended mid-value. Check that the full document was transferred.")
    )]
    Truncated { offset: usize, needed: usize },

    #[error("Expected {expected} at offset {offset}, found {found}")]
    #[diagnostic(
        code(format::unexpected_tag),
        help("Keys and class names must be string values; containers must end with a close tag.")
    )]
    UnexpectedTag {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("Malformed numeral {text:?} at offset {offset}")]
    #[diagnostic(
        code(format::bad_numeral),
        help("Numerals are decimal digit runs (optionally signed/fractional for numbers) ending in a separator.")
    )]
    BadNumeral { text: String, offset: usize },

    #[error("Separator not found within {scanned} characters at offset {offset}")]
    #[diagnostic(
        code(format::separator_not_found),
        help("A numeral exceeded the bounded lookahead. The stream is corrupt or not textual-form.")
    )]
    SeparatorNotFound { offset: usize, scanned: usize },

    #[error("Invalid UTF-8 in string payload at offset {offset}")]
    #[diagnostic(code(format::bad_utf8))]
    BadUtf8 { offset: usize },

    #[error("Invalid base64 in buffer payload at offset {offset}")]
    #[diagnostic(code(format::bad_base64))]
    BadBase64 { offset: usize },

    #[error("Trailing data after the root value at offset {offset}")]
    #[diagnostic(
        code(format::trailing_data),
        help("A document holds exactly one root value. Concatenated documents must be framed externally.")
    )]
    TrailingData { offset: usize },

    #[error("{kind} values have no representation in the binary form")]
    #[diagnostic(
        code(format::unrepresentable),
        help("Maps, buffers, and prototype-carrying objects are textual-form only.")
    )]
    Unrepresentable { kind: String },

    #[error("Constructor arguments for class {class:?} reach back into the instance being encoded")]
    #[diagnostic(
        code(format::cyclic_constructor),
        help("An instance has no reference slot until its constructor arguments are written; the serializer must not emit the instance inside its own arguments.")
    )]
    CyclicConstructor { class: String },

    #[error("Prototype chain of an object cycles back into the object itself")]
    #[diagnostic(code(format::cyclic_prototype))]
    CyclicPrototype,
}

/// Class registry resolution errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum RegistryError {
    #[error("Class {0:?} is not registered and no fallback is enabled")]
    #[diagnostic(
        code(registry::unknown_class),
        help("Register the class, supply a universal descriptor, or enable unknown-class handling.")
    )]
    UnknownClass(String),

    #[error("Class {0:?} has no construct hook")]
    #[diagnostic(
        code(registry::not_constructible),
        help("A constructed instance needs a construct hook on its descriptor to be rebuilt.")
    )]
    NotConstructible(String),

    #[error("Class {0:?} has no serialize hook")]
    #[diagnostic(
        code(registry::not_serializable),
        help("A universal descriptor used for encoding must carry a serialize hook.")
    )]
    NotSerializable(String),

    #[error("Construct hook for class {class:?} returned a value that cannot hold entries: {reason}")]
    #[diagnostic(
        code(registry::bad_construction),
        help("Override entries are assigned by key; the hook must return an object- or instance-valued node.")
    )]
    BadConstruction { class: String, reason: String },
}

/// Unified codec error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CodecError {
    #[error("Format error: {0}")]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error("Registry error: {0}")]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error("Length {length} exceeds the largest wire length class (max {max})")]
    #[diagnostic(
        code(codec::limit_exceeded),
        help("The 32-bit length class is the escalation ceiling; split the payload externally.")
    )]
    LimitExceeded { length: u64, max: u64 },

    #[error("Bad reference: slot {slot} out of range ({populated} slot(s) populated)")]
    #[diagnostic(
        code(codec::bad_reference),
        help("The stream is corrupt, or encoder and decoder disagree on slot allocation.")
    )]
    BadReference { slot: SlotId, populated: usize },

    #[error("I/O error: {0}")]
    #[diagnostic(code(codec::io_error))]
    Io(String),

    #[error("Internal error: {0}")]
    #[diagnostic(
        code(codec::internal_error),
        help("An invariant was violated. This usually means a value references a foreign graph.")
    )]
    Internal(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

/// Serializable error representation for tooling output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SerializableError {
    pub error_type: String,
    pub message: String,
}

impl From<&CodecError> for SerializableError {
    fn from(err: &CodecError) -> Self {
        let error_type = match err {
            CodecError::Format(_) => "format_error",
            CodecError::Registry(_) => "registry_error",
            CodecError::LimitExceeded { .. } => "limit_exceeded",
            CodecError::BadReference { .. } => "bad_reference",
            CodecError::Io(_) => "io_error",
            CodecError::Internal(_) => "internal_error",
        };
        SerializableError {
            error_type: error_type.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for codec operations
///
/// # Must Use
/// Codec operations can fail and a partial value must never be observed
pub type Result<T> = std::result::Result<T, CodecError>;
