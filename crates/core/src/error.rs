//! Core error types
//!
//! Each parser in this crate has its own error so callers can tell a bad name
//! from a bad pattern or a malformed configuration file.

use thiserror::Error;

/// Failure to parse a name from its URI representation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// A `%` that is not followed by two hex digits.
    #[error("invalid percent-escape in name component: {component}")]
    InvalidEscape { component: String },

    /// `.` and `..` have no component encoding.
    #[error("illegal name component: {component}")]
    IllegalComponent { component: String },
}

/// Failure to compile a name pattern.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid name pattern `{pattern}`: {reason}")]
pub struct PatternError {
    /// The full pattern text as supplied.
    pub pattern: String,
    /// What is wrong with it.
    pub reason: String,
}

impl PatternError {
    pub(crate) fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure to parse an INFO-format configuration text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("configuration syntax error at line {line}: {reason}")]
pub struct SectionError {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

/// Core error type for the trust workspace
#[derive(Debug, Error)]
pub enum CoreError {
    /// Name parsing errors
    #[error("Name error: {0}")]
    Name(#[from] NameError),

    /// Pattern compilation errors
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Configuration section errors
    #[error("Section error: {0}")]
    Section(#[from] SectionError),

    /// TOML settings errors
    #[cfg(feature = "toml")]
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
