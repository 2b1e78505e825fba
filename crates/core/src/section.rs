//! Ordered key/value configuration trees.
//!
//! Trust rules are written in the INFO property-tree format used by NDN
//! validator configuration files:
//!
//! ```text
//! ; comment
//! filter
//! {
//!   type name
//!   name /localhost/example
//!   relation is-prefix-of
//! }
//! ```
//!
//! Entry order is preserved; consumers walk a [`ConfigSection`] sequentially.

use crate::error::SectionError;
use tracing::debug;

/// Deepest child-block nesting accepted by [`ConfigSection::parse_info`].
pub const MAX_DEPTH: usize = 64;

/// One `key value { ... }` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEntry {
    key: String,
    value: String,
    section: ConfigSection,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            section: ConfigSection::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw value text; empty when the entry only has a nested section.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Nested section; empty when the entry has none.
    pub fn section(&self) -> &ConfigSection {
        &self.section
    }
}

/// An ordered sequence of configuration entries. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    entries: Vec<ConfigEntry>,
}

impl ConfigSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append of a plain `key value` entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(ConfigEntry::new(key, value));
        self
    }

    /// Builder-style append of an entry carrying a nested section.
    pub fn with_section(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        section: ConfigSection,
    ) -> Self {
        let mut entry = ConfigEntry::new(key, value);
        entry.section = section;
        self.push(entry);
        self
    }

    pub fn push(&mut self, entry: ConfigEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose key equals `key`, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|e| e.key.eq_ignore_ascii_case(key))
    }

    /// Parse INFO-format text.
    pub fn parse_info(text: &str) -> Result<Self, SectionError> {
        let tokens = tokenize(text)?;
        let last_line = tokens.last().map_or(1, |t| t.line);
        let mut idx = 0;
        let section = parse_entries(&tokens, &mut idx, 0, last_line)?;

        debug!(entries = section.len(), lines = last_line, "parsed INFO configuration");
        Ok(section)
    }
}

impl<'a> IntoIterator for &'a ConfigSection {
    type Item = &'a ConfigEntry;
    type IntoIter = std::slice::Iter<'a, ConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Open,
    Close,
    Newline,
}

#[derive(Debug)]
struct Lexed {
    token: Token,
    line: usize,
}

fn syntax_error(line: usize, reason: impl Into<String>) -> SectionError {
    SectionError {
        line,
        reason: reason.into(),
    }
}

fn tokenize(text: &str) -> Result<Vec<Lexed>, SectionError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                tokens.push(Lexed {
                    token: Token::Newline,
                    line,
                });
                line += 1;
            }
            ';' => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            '{' => tokens.push(Lexed {
                token: Token::Open,
                line,
            }),
            '}' => tokens.push(Lexed {
                token: Token::Close,
                line,
            }),
            '"' => {
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => word.push('\n'),
                            Some('t') => word.push('\t'),
                            Some('"') => word.push('"'),
                            Some('\\') => word.push('\\'),
                            Some(other) => {
                                return Err(syntax_error(
                                    line,
                                    format!("unknown escape sequence \\{}", other),
                                ))
                            }
                            None => return Err(syntax_error(line, "unterminated string")),
                        },
                        Some('\n') | None => return Err(syntax_error(line, "unterminated string")),
                        Some(other) => word.push(other),
                    }
                }
                tokens.push(Lexed {
                    token: Token::Word(word),
                    line,
                });
            }
            c if c.is_whitespace() => {}
            c => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '{' | '}' | ';' | '"') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Lexed {
                    token: Token::Word(word),
                    line,
                });
            }
        }
    }

    Ok(tokens)
}

fn parse_entries(
    tokens: &[Lexed],
    idx: &mut usize,
    depth: usize,
    last_line: usize,
) -> Result<ConfigSection, SectionError> {
    let mut section = ConfigSection::new();

    while let Some(Lexed { token, line }) = tokens.get(*idx) {
        match token {
            Token::Newline => *idx += 1,
            Token::Close => {
                if depth == 0 {
                    return Err(syntax_error(*line, "unmatched '}'"));
                }
                *idx += 1;
                return Ok(section);
            }
            Token::Open => return Err(syntax_error(*line, "'{' without a key")),
            Token::Word(key) => {
                *idx += 1;

                let mut entry = ConfigEntry::new(key.clone(), String::new());
                if let Some(Lexed {
                    token: Token::Word(value),
                    ..
                }) = tokens.get(*idx)
                {
                    entry.value = value.clone();
                    *idx += 1;
                }
                if let Some(Lexed {
                    token: Token::Word(extra),
                    line,
                }) = tokens.get(*idx)
                {
                    return Err(syntax_error(
                        *line,
                        format!("unexpected '{}' after value of '{}'", extra, key),
                    ));
                }

                // A child block may open on the same line or on a following one.
                let mut look = *idx;
                while matches!(tokens.get(look), Some(Lexed { token: Token::Newline, .. })) {
                    look += 1;
                }
                if let Some(Lexed {
                    token: Token::Open,
                    line: open_line,
                }) = tokens.get(look)
                {
                    if depth >= MAX_DEPTH {
                        return Err(syntax_error(
                            *open_line,
                            format!("sections nested deeper than {} levels", MAX_DEPTH),
                        ));
                    }
                    *idx = look + 1;
                    entry.section = parse_entries(tokens, idx, depth + 1, last_line)?;
                }

                section.push(entry);
            }
        }
    }

    if depth > 0 {
        return Err(syntax_error(last_line, "unterminated '{'"));
    }

    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = r#"
; validator rule
rule
{
  id "Simple Rule"
  for data
  filter
  {
    type name
    name /localhost/example
    relation is-prefix-of
  }
  checker { type customized }
}
"#;

    #[test]
    fn test_parse_nested_rule() {
        let root = ConfigSection::parse_info(RULE).unwrap();
        assert_eq!(root.len(), 1);

        let rule = root.get("RULE").unwrap().section();
        let keys: Vec<&str> = rule.iter().map(ConfigEntry::key).collect();
        assert_eq!(keys, ["id", "for", "filter", "checker"]);
        assert_eq!(rule.get("id").unwrap().value(), "Simple Rule");

        let filter = rule.get("filter").unwrap().section();
        let pairs: Vec<(&str, &str)> = filter.iter().map(|e| (e.key(), e.value())).collect();
        assert_eq!(
            pairs,
            [
                ("type", "name"),
                ("name", "/localhost/example"),
                ("relation", "is-prefix-of")
            ]
        );

        let checker = rule.get("checker").unwrap().section();
        assert_eq!(checker.get("type").unwrap().value(), "customized");
    }

    #[test]
    fn test_builder_matches_parser() {
        let built = ConfigSection::new().with_section(
            "filter",
            "",
            ConfigSection::new()
                .with("type", "name")
                .with("regex", "^<a><b><.*>$"),
        );
        let parsed =
            ConfigSection::parse_info("filter\n{\n  type name\n  regex ^<a><b><.*>$\n}\n").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_quoted_escapes() {
        let root = ConfigSection::parse_info(r#"key "a \"b\"\t\\""#).unwrap();
        assert_eq!(root.get("key").unwrap().value(), "a \"b\"\t\\");
    }

    #[test]
    fn test_nesting_depth_is_capped() {
        let nested = |levels: usize| format!("{}{}", "a {\n".repeat(levels), "}\n".repeat(levels));

        assert!(ConfigSection::parse_info(&nested(MAX_DEPTH)).is_ok());

        let err = ConfigSection::parse_info(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(err.line, MAX_DEPTH + 1);
        assert!(err.reason.contains("nested deeper"));

        assert!(ConfigSection::parse_info(&nested(200_000)).is_err());
    }

    #[test]
    fn test_syntax_errors() {
        let err = ConfigSection::parse_info("a 1\n}\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = ConfigSection::parse_info("a\n{\n  b 1\n").unwrap_err();
        assert!(err.reason.contains("unterminated"));

        let err = ConfigSection::parse_info("a \"open\n").unwrap_err();
        assert!(err.reason.contains("unterminated string"));

        let err = ConfigSection::parse_info("{ a 1 }").unwrap_err();
        assert_eq!(err.line, 1);

        let err = ConfigSection::parse_info("a 1 2").unwrap_err();
        assert!(err.reason.contains("unexpected '2'"));
    }
}
