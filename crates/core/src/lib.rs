//! Core types for the NDN trust layer.
//!
//! This crate provides the name model, the name-pattern engine and the
//! configuration plumbing shared by the trust filter and key codec crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod name;
pub mod packet;
pub mod name_regex;
pub mod section;

pub use config::{LoggingConfig, PolicyConfig, TrustConfig};
pub use error::{CoreError, CoreResult, NameError, PatternError, SectionError};
pub use name::{Component, Name};
pub use packet::{Packet, PacketKind};
pub use name_regex::NameRegex;
pub use section::{ConfigEntry, ConfigSection};
