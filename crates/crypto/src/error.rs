//! Error types for key decoding.

use crate::ber::Tag;
use thiserror::Error;

/// Structural violation in BER/DER input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("input truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("invalid tag at offset {offset}")]
    InvalidTag { offset: usize },

    #[error("indefinite length at offset {offset} is not supported")]
    IndefiniteLength { offset: usize },

    #[error("invalid length encoding at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("element at offset {offset} declares {length} bytes but only {remaining} remain")]
    LengthOverrun {
        offset: usize,
        length: usize,
        remaining: usize,
    },

    #[error("expected {expected}, found {found}")]
    UnexpectedTag { expected: Tag, found: Tag },

    #[error("{count} trailing bytes after the encoded structure")]
    TrailingData { count: usize },

    #[error("malformed object identifier")]
    InvalidObjectIdentifier,
}

/// Errors that can occur while loading a public key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The blob is not a well-formed SubjectPublicKeyInfo
    #[error("public key decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// Well-formed, but not an RSA key
    #[error("only RSA public keys are supported ({found} requested)")]
    UnsupportedAlgorithm { found: String },
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;
