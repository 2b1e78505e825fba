//! Name matchers.

use ndn_trust_core::{Name, NameRegex, PatternError};
use std::fmt;

/// How a configured name relates to the names it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `equal`
    Equal,
    /// `is-prefix-of`
    IsPrefixOf,
    /// `is-strict-prefix-of`
    IsStrictPrefixOf,
}

impl Relation {
    /// Parse a relation keyword, ignoring ASCII case.
    pub fn parse(text: &str) -> Option<Self> {
        [Self::Equal, Self::IsPrefixOf, Self::IsStrictPrefixOf]
            .into_iter()
            .find(|relation| relation.as_str().eq_ignore_ascii_case(text))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Equal => "equal",
            Relation::IsPrefixOf => "is-prefix-of",
            Relation::IsStrictPrefixOf => "is-strict-prefix-of",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a name satisfies a filter.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Candidate equals the stored name.
    Exact(Name),
    /// Stored name is a prefix of, or equal to, the candidate.
    Prefix(Name),
    /// Stored name is a prefix of the candidate and not equal to it.
    StrictPrefix(Name),
    /// Candidate is accepted by the name pattern.
    Regex(NameRegex),
}

impl NameMatcher {
    pub fn from_relation(name: Name, relation: Relation) -> Self {
        match relation {
            Relation::Equal => NameMatcher::Exact(name),
            Relation::IsPrefixOf => NameMatcher::Prefix(name),
            Relation::IsStrictPrefixOf => NameMatcher::StrictPrefix(name),
        }
    }

    /// Compile `pattern` into a regex matcher.
    pub fn regex(pattern: &str) -> Result<Self, PatternError> {
        NameRegex::compile(pattern).map(NameMatcher::Regex)
    }

    pub fn matches(&self, candidate: &Name) -> bool {
        match self {
            NameMatcher::Exact(name) => name == candidate,
            NameMatcher::Prefix(name) => name.is_prefix_of(candidate),
            // A strict-prefix filter never covers the namespace it is scoped under.
            NameMatcher::StrictPrefix(name) => {
                name.len() < candidate.len() && name.is_prefix_of(candidate)
            }
            NameMatcher::Regex(regex) => regex.is_match(candidate),
        }
    }
}

impl fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatcher::Exact(name) => write!(f, "{} {}", Relation::Equal, name),
            NameMatcher::Prefix(name) => write!(f, "{} {}", Relation::IsPrefixOf, name),
            NameMatcher::StrictPrefix(name) => {
                write!(f, "{} {}", Relation::IsStrictPrefixOf, name)
            }
            NameMatcher::Regex(regex) => write!(f, "regex {}", regex),
        }
    }
}
