//! Trust filters over signed packets.

use crate::matcher::NameMatcher;
use ndn_trust_core::{Name, Packet};
use tracing::trace;

/// Components a signed Interest carries after its signed portion:
/// SignatureInfo and SignatureValue.
pub const SIGNED_INTEREST_SUFFIX_LEN: usize = 2;

/// A compiled trust rule deciding whether a packet's name is covered.
///
/// Filters hold no mutable state and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct TrustFilter {
    matcher: NameMatcher,
}

impl TrustFilter {
    pub fn new(matcher: NameMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }

    /// Test a signed packet against this filter.
    ///
    /// Data names are matched as-is. Interest names have their two signature
    /// components stripped first; an Interest name too short to carry them
    /// never matches.
    pub fn matches(&self, packet: Packet<'_>) -> bool {
        let matched = match packet {
            Packet::Data(name) => self.matcher.matches(name),
            Packet::Interest(name) => match name.without_suffix(SIGNED_INTEREST_SUFFIX_LEN) {
                Some(signed) => self.matcher.matches(&signed),
                None => false,
            },
        };

        trace!(
            kind = %packet.kind(),
            name = %packet.name(),
            filter = %self.matcher,
            matched,
            "trust filter evaluated"
        );
        matched
    }

    /// Shorthand for `matches(Packet::Data(name))`.
    pub fn matches_data(&self, name: &Name) -> bool {
        self.matches(Packet::Data(name))
    }

    /// Shorthand for `matches(Packet::Interest(name))`.
    pub fn matches_interest(&self, name: &Name) -> bool {
        self.matches(Packet::Interest(name))
    }
}

impl From<NameMatcher> for TrustFilter {
    fn from(matcher: NameMatcher) -> Self {
        Self::new(matcher)
    }
}

/// The filters of one policy rule.
///
/// A packet is covered when any filter matches. A set without filters
/// places no constraint and covers every packet.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<TrustFilter>,
}

impl FilterSet {
    pub fn new(filters: Vec<TrustFilter>) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &[TrustFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, packet: Packet<'_>) -> bool {
        self.filters.is_empty() || self.first_match(packet).is_some()
    }

    /// Index of the first filter matching `packet`.
    pub fn first_match(&self, packet: Packet<'_>) -> Option<usize> {
        self.filters.iter().position(|filter| filter.matches(packet))
    }
}

impl FromIterator<TrustFilter> for FilterSet {
    fn from_iter<I: IntoIterator<Item = TrustFilter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
