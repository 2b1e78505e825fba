//! Hierarchical NDN names.
//!
//! A [`Name`] is an ordered sequence of opaque [`Component`]s. Names are
//! immutable values as far as the trust layer is concerned: filters compare
//! them, test prefix relations and strip signature suffixes, nothing more.

use crate::error::NameError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single opaque name component.
///
/// Components order canonically: a shorter component sorts first, equal
/// lengths compare byte by byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Component(Vec<u8>);

impl Component {
    /// Create a component from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse a component from its percent-escaped URI form.
    ///
    /// A component made only of periods loses three of them (`...` is the
    /// empty component); `.` and `..` cannot be represented and are rejected.
    pub fn from_escaped(text: &str) -> Result<Self, NameError> {
        let trimmed = text.trim();
        let bytes = unescape(trimmed)?;

        if bytes.iter().all(|&b| b == b'.') {
            if bytes.len() < 3 {
                return Err(NameError::IllegalComponent {
                    component: trimmed.to_string(),
                });
            }
            return Ok(Self(bytes[3..].to_vec()));
        }

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Percent-escaped URI form of this component.
    pub fn to_uri(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 3);

        if self.0.iter().all(|&b| b == b'.') {
            out.push_str("...");
        }

        for &b in &self.0 {
            if b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.' | b'_') {
                out.push(char::from(b));
            } else {
                out.push_str(&format!("%{:02X}", b));
            }
        }

        out
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&[u8]> for Component {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Component {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// An NDN name.
///
/// Names order component by component; a proper prefix sorts before the
/// names it covers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// The empty name `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a name from its URI representation, e.g. `/a/b/%2F` or `ndn:/a/b`.
    ///
    /// Empty segments are skipped, so `/a//b/` is the same name as `/a/b`.
    pub fn from_uri(uri: &str) -> Result<Self, NameError> {
        let mut rest = uri.trim();

        if let Some(stripped) = rest.strip_prefix("ndn:") {
            rest = stripped;
            if let Some(authority) = rest.strip_prefix("//") {
                rest = authority.find('/').map_or("", |idx| &authority[idx..]);
            }
        }

        let mut name = Name::new();
        for segment in rest.split('/') {
            if segment.trim().is_empty() {
                continue;
            }
            name.components.push(Component::from_escaped(segment)?);
        }

        Ok(name)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Append a component in place.
    pub fn push(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    /// Builder-style append.
    pub fn append(mut self, component: impl Into<Component>) -> Self {
        self.push(component);
        self
    }

    /// The first `len` components (the whole name if it is shorter).
    pub fn prefix(&self, len: usize) -> Name {
        let len = len.min(self.components.len());
        Name {
            components: self.components[..len].to_vec(),
        }
    }

    /// This name with its last `count` components removed, or `None` when
    /// the name has fewer than `count` components.
    pub fn without_suffix(&self, count: usize) -> Option<Name> {
        let len = self.components.len().checked_sub(count)?;
        Some(self.prefix(len))
    }

    /// True when `self` is a prefix of, or equal to, `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.components.starts_with(&self.components)
    }

    /// URI representation; the empty name renders as `/`.
    pub fn to_uri(&self) -> String {
        if self.components.is_empty() {
            return "/".to_string();
        }

        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            out.push_str(&component.to_uri());
        }
        out
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::from_uri(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromIterator<Component> for Name {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Name {
            components: iter.into_iter().collect(),
        }
    }
}

fn unescape(text: &str) -> Result<Vec<u8>, NameError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            out.push(bytes[idx]);
            idx += 1;
            continue;
        }

        let hi = bytes.get(idx + 1).copied().and_then(hex_value);
        let lo = bytes.get(idx + 2).copied().and_then(hex_value);
        match (hi, lo) {
            (Some(hi), Some(lo)) => {
                out.push((hi << 4) | lo);
                idx += 3;
            }
            _ => {
                return Err(NameError::InvalidEscape {
                    component: text.to_string(),
                })
            }
        }
    }

    Ok(out)
}

fn hex_value(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_parse_and_render() {
        let n = name("/a/b/c");
        assert_eq!(n.len(), 3);
        assert_eq!(n.get(1), Some(&Component::from("b")));
        assert_eq!(n.to_uri(), "/a/b/c");
        assert_eq!(Name::new().to_uri(), "/");
    }

    #[test]
    fn test_empty_segments_and_scheme() {
        assert_eq!(name("/a//b/"), name("/a/b"));
        assert_eq!(name("ndn:/a/b"), name("/a/b"));
        assert_eq!(name("ndn://authority/a/b"), name("/a/b"));
        assert_eq!(name("a/b"), name("/a/b"));
        assert!(name("/").is_empty());
        assert!(name("").is_empty());
    }

    #[test]
    fn test_percent_escapes() {
        let n = name("/hello%20world/%2F");
        assert_eq!(n.get(0).unwrap().as_bytes(), b"hello world");
        assert_eq!(n.get(1).unwrap().as_bytes(), b"/");
        assert_eq!(n.to_uri(), "/hello%20world/%2F");

        let raw = Name::new().append(&[0x00u8, 0xff][..]);
        assert_eq!(raw.to_uri(), "/%00%FF");
        assert_eq!(name(&raw.to_uri()), raw);
    }

    #[test]
    fn test_period_components() {
        let n = name("/a/.../....");
        assert!(n.get(1).unwrap().is_empty());
        assert_eq!(n.get(2).unwrap().as_bytes(), b".");
        assert_eq!(n.to_uri(), "/a/.../....");
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(
            Name::from_uri("/a/%zz"),
            Err(NameError::InvalidEscape { .. })
        ));
        assert!(matches!(
            Name::from_uri("/a/%4"),
            Err(NameError::InvalidEscape { .. })
        ));
        assert!(matches!(
            Name::from_uri("/a/./b"),
            Err(NameError::IllegalComponent { .. })
        ));
        assert!(matches!(
            Name::from_uri("/a/.."),
            Err(NameError::IllegalComponent { .. })
        ));
    }

    #[test]
    fn test_prefix_relations() {
        let ab = name("/a/b");
        assert!(ab.is_prefix_of(&name("/a/b/c")));
        assert!(ab.is_prefix_of(&ab));
        assert!(Name::new().is_prefix_of(&ab));
        assert!(!ab.is_prefix_of(&name("/a")));
        assert!(!ab.is_prefix_of(&name("/a/bc")));
    }

    #[test]
    fn test_canonical_order() {
        assert!(Component::from("z") < Component::from("aa"));
        assert!(Component::from("ab") < Component::from("b0"));
        assert!(Component::new(Vec::new()) < Component::from("a"));

        let mut names = vec![name("/b"), name("/aa"), name("/a/z"), name("/a"), name("/")];
        names.sort();
        assert_eq!(
            names,
            [name("/"), name("/a"), name("/a/z"), name("/b"), name("/aa")]
        );
    }

    #[test]
    fn test_suffix_removal() {
        let n = name("/a/b/c/d");
        assert_eq!(n.without_suffix(2), Some(name("/a/b")));
        assert_eq!(n.without_suffix(4), Some(Name::new()));
        assert_eq!(n.without_suffix(5), None);
        assert_eq!(n.prefix(10), n);
    }
}
