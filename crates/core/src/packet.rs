//! Signed packet views used by trust decisions.

use crate::name::Name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of signed packet a trust filter can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketKind {
    Data,
    Interest,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketKind::Data => f.write_str("data"),
            PacketKind::Interest => f.write_str("interest"),
        }
    }
}

/// A borrowed view of a signed packet's name.
///
/// An Interest name still carries its signature-info and signature-value
/// components; deriving the signed name is left to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    Data(&'a Name),
    Interest(&'a Name),
}

impl<'a> Packet<'a> {
    pub fn name(&self) -> &'a Name {
        match self {
            Packet::Data(name) | Packet::Interest(name) => name,
        }
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            Packet::Data(_) => PacketKind::Data,
            Packet::Interest(_) => PacketKind::Interest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let name = Name::from_uri("/a/b").unwrap();
        let data = Packet::Data(&name);
        let interest = Packet::Interest(&name);

        assert_eq!(data.kind(), PacketKind::Data);
        assert_eq!(interest.kind(), PacketKind::Interest);
        assert_eq!(interest.name(), &name);
        assert_eq!(PacketKind::Interest.to_string(), "interest");
    }
}
