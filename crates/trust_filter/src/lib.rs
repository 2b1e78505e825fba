//! Trust filters for NDN packet validation
//!
//! This crate compiles declarative filter rules into matchers that decide
//! whether a signed packet's name is covered by a trust policy:
//! - Exact, prefix and strict-prefix relations against a configured name
//! - Name patterns (`^<a><b><.*>$`) evaluated by the core regex engine
//! - Signed-Interest handling: the trailing SignatureInfo and SignatureValue
//!   components are removed before matching
//!
//! Compilation is strict and sequential; every malformed rule is reported as
//! a [`ConfigError`] naming the offending key or value.

pub mod compiler;
pub mod error;
pub mod filter;
pub mod matcher;

pub use compiler::FilterCompiler;
pub use error::{ConfigError, ConfigResult};
pub use filter::{FilterSet, TrustFilter, SIGNED_INTEREST_SUFFIX_LEN};
pub use matcher::{NameMatcher, Relation};

// Re-export the core types callers need to build packets and sections
pub use ndn_trust_core::{ConfigSection, Name, Packet, PatternError};
