//! Error types for trust filter compilation.
//!
//! Every variant names the offending key or value so a policy loader can
//! report exactly which rule is broken.

use ndn_trust_core::{NameError, PatternError, SectionError};
use thiserror::Error;

/// Errors raised while compiling a filter configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The first key is absent or is not `type`
    #[error("expected <filter.type>")]
    MissingType,

    /// `type` names a filter kind other than `name`
    #[error("unsupported filter.type: {0}")]
    UnsupportedType(String),

    /// `type name` with nothing after it
    #[error("expected more properties for filter(name)")]
    MissingProperties,

    /// The key after `type` is neither `name` nor `regex`
    #[error("wrong filter(name) property: {0}")]
    UnexpectedProperty(String),

    /// `name` value is not a valid name URI
    #[error("wrong filter.name: {value}")]
    InvalidName {
        value: String,
        #[source]
        source: NameError,
    },

    /// `name` not followed by `relation`
    #[error("expected <filter.relation>")]
    MissingRelation,

    /// `relation` value is not one of the three known relations
    #[error("unsupported relation: {0}")]
    UnsupportedRelation(String),

    /// `regex` value does not compile
    #[error("wrong filter.regex: {pattern}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// Extra key after a complete filter definition
    #[error("expected the end of filter, found <{0}>")]
    TrailingProperty(String),

    /// A filter property carries a child block (often an unquoted `{`)
    #[error("unexpected nested section under <filter.{0}>")]
    NestedSection(String),

    /// Top-level policy key other than `filter`
    #[error("unexpected policy entry <{0}>, expected <filter>")]
    UnexpectedEntry(String),

    /// Policy text is not valid INFO syntax
    #[error("policy syntax error: {0}")]
    Section(#[from] SectionError),
}

/// Result type for filter compilation.
pub type ConfigResult<T> = Result<T, ConfigError>;
