//! Compilation of filter configuration sections.
//!
//! A filter section is a sequential grammar, not a bag of attributes:
//!
//! ```text
//! filter            filter
//! {                 {
//!   type name         type name
//!   name /a/b         regex ^<a><b><.*>$
//!   relation equal  }
//! }
//! ```
//!
//! `type` must come first, `relation` only directly after `name`, and nothing
//! may follow a complete definition. Keys and keyword values are matched
//! ignoring ASCII case.

use crate::error::{ConfigError, ConfigResult};
use crate::filter::{FilterSet, TrustFilter};
use crate::matcher::{NameMatcher, Relation};
use ndn_trust_core::{ConfigEntry, ConfigSection, Name};
use tracing::debug;

const FILTER_KEY: &str = "filter";
const TYPE_KEY: &str = "type";
const NAME_TYPE: &str = "name";
const NAME_KEY: &str = "name";
const RELATION_KEY: &str = "relation";
const REGEX_KEY: &str = "regex";

/// Turns configuration sections into [`TrustFilter`]s.
pub struct FilterCompiler;

impl FilterCompiler {
    /// Compile one filter section.
    pub fn compile(section: &ConfigSection) -> ConfigResult<TrustFilter> {
        let mut properties = section.iter();

        let filter_type = match properties.next() {
            Some(entry) if entry.key().eq_ignore_ascii_case(TYPE_KEY) => plain_value(entry)?,
            _ => return Err(ConfigError::MissingType),
        };

        if !filter_type.eq_ignore_ascii_case(NAME_TYPE) {
            return Err(ConfigError::UnsupportedType(filter_type.to_string()));
        }

        let matcher = Self::compile_name_filter(&mut properties)?;
        debug!(filter = %matcher, "compiled trust filter");
        Ok(TrustFilter::new(matcher))
    }

    /// Compile every top-level `filter` entry of a policy.
    pub fn compile_all(policy: &ConfigSection) -> ConfigResult<FilterSet> {
        let filters = policy
            .iter()
            .map(|entry| {
                if entry.key().eq_ignore_ascii_case(FILTER_KEY) {
                    Self::compile(entry.section())
                } else {
                    Err(ConfigError::UnexpectedEntry(entry.key().to_string()))
                }
            })
            .collect::<ConfigResult<FilterSet>>()?;

        debug!(count = filters.len(), "compiled trust policy");
        Ok(filters)
    }

    /// Parse INFO-format policy text and compile its filters.
    pub fn compile_policy(text: &str) -> ConfigResult<FilterSet> {
        let policy = ConfigSection::parse_info(text)?;
        Self::compile_all(&policy)
    }

    fn compile_name_filter<'a, I>(properties: &mut I) -> ConfigResult<NameMatcher>
    where
        I: Iterator<Item = &'a ConfigEntry>,
    {
        let property = properties.next().ok_or(ConfigError::MissingProperties)?;

        if property.key().eq_ignore_ascii_case(NAME_KEY) {
            let value = plain_value(property)?;
            let name = Name::from_uri(value).map_err(|source| ConfigError::InvalidName {
                value: value.to_string(),
                source,
            })?;

            let relation_text = match properties.next() {
                Some(entry) if entry.key().eq_ignore_ascii_case(RELATION_KEY) => {
                    plain_value(entry)?
                }
                _ => return Err(ConfigError::MissingRelation),
            };
            let relation = Relation::parse(relation_text)
                .ok_or_else(|| ConfigError::UnsupportedRelation(relation_text.to_string()))?;

            Self::expect_end(properties)?;
            Ok(NameMatcher::from_relation(name, relation))
        } else if property.key().eq_ignore_ascii_case(REGEX_KEY) {
            let pattern = plain_value(property)?;
            Self::expect_end(properties)?;

            NameMatcher::regex(pattern).map_err(|source| ConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
        } else {
            Err(ConfigError::UnexpectedProperty(property.key().to_string()))
        }
    }

    fn expect_end<'a, I>(properties: &mut I) -> ConfigResult<()>
    where
        I: Iterator<Item = &'a ConfigEntry>,
    {
        match properties.next() {
            Some(extra) => Err(ConfigError::TrailingProperty(extra.key().to_string())),
            None => Ok(()),
        }
    }
}

/// Value of a filter property, which may not carry a child block.
///
/// An unquoted `{` inside a value starts a child block in INFO syntax, so
/// `regex ^<a>{2}` arrives as `^<a>` plus a block and must not compile.
fn plain_value(entry: &ConfigEntry) -> ConfigResult<&str> {
    if entry.section().is_empty() {
        Ok(entry.value())
    } else {
        Err(ConfigError::NestedSection(entry.key().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_trust_core::Packet;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    fn relation_section(name: &str, relation: &str) -> ConfigSection {
        ConfigSection::new()
            .with("type", "name")
            .with("name", name)
            .with("relation", relation)
    }

    #[test]
    fn test_strict_prefix_scenario() {
        let filter =
            FilterCompiler::compile(&relation_section("/a/b", "is-strict-prefix-of")).unwrap();

        assert!(filter.matches(Packet::Data(&name("/a/b/c"))));
        assert!(!filter.matches(Packet::Data(&name("/a/b"))));
        assert!(!filter.matches(Packet::Data(&name("/x"))));
    }

    #[test]
    fn test_relations_map_to_matchers() {
        let cases = [
            ("equal", "Exact"),
            ("is-prefix-of", "Prefix"),
            ("IS-STRICT-PREFIX-OF", "StrictPrefix"),
        ];
        for (relation, variant) in cases {
            let filter = FilterCompiler::compile(&relation_section("/a", relation)).unwrap();
            let matches = match filter.matcher() {
                NameMatcher::Exact(_) => "Exact",
                NameMatcher::Prefix(_) => "Prefix",
                NameMatcher::StrictPrefix(_) => "StrictPrefix",
                NameMatcher::Regex(_) => "Regex",
            };
            assert_eq!(matches, variant);
        }
    }

    #[test]
    fn test_keys_and_type_are_case_insensitive() {
        let section = ConfigSection::new()
            .with("TYPE", "Name")
            .with("Name", "/a")
            .with("RELATION", "Equal");
        let filter = FilterCompiler::compile(&section).unwrap();
        assert!(filter.matches_data(&name("/a")));
    }

    #[test]
    fn test_regex_filter() {
        let section = ConfigSection::new()
            .with("type", "name")
            .with("regex", "^<a><b><.*>$");
        let filter = FilterCompiler::compile(&section).unwrap();
        assert!(filter.matches_data(&name("/a/b/c")));
        assert!(!filter.matches_data(&name("/a/b")));
    }

    #[test]
    fn test_missing_or_misplaced_type() {
        assert_eq!(
            FilterCompiler::compile(&ConfigSection::new()).unwrap_err(),
            ConfigError::MissingType
        );

        let section = ConfigSection::new()
            .with("name", "/a")
            .with("type", "name");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::MissingType
        );
    }

    #[test]
    fn test_unsupported_type() {
        let section = ConfigSection::new()
            .with("type", "customized")
            .with("name", "/a");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::UnsupportedType("customized".to_string())
        );
    }

    #[test]
    fn test_missing_properties() {
        let section = ConfigSection::new().with("type", "name");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::MissingProperties
        );

        let section = ConfigSection::new()
            .with("type", "name")
            .with("prefix", "/a");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::UnexpectedProperty("prefix".to_string())
        );
    }

    #[test]
    fn test_relation_must_follow_name() {
        let section = ConfigSection::new().with("type", "name").with("name", "/a");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::MissingRelation
        );

        let section = ConfigSection::new()
            .with("type", "name")
            .with("name", "/a")
            .with("regex", "<a>")
            .with("relation", "equal");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::MissingRelation
        );
    }

    #[test]
    fn test_bad_values() {
        let err = FilterCompiler::compile(&relation_section("/a/%zz", "equal")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { ref value, .. } if value == "/a/%zz"));

        let err = FilterCompiler::compile(&relation_section("/a", "is-suffix-of")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedRelation("is-suffix-of".to_string())
        );
    }

    #[test]
    fn test_invalid_regex_reports_pattern() {
        let section = ConfigSection::new()
            .with("type", "name")
            .with("regex", "^<a><b");
        let err = FilterCompiler::compile(&section).unwrap_err();

        match &err {
            ConfigError::InvalidRegex { pattern, source } => {
                assert_eq!(pattern, "^<a><b");
                assert_eq!(source.pattern, "^<a><b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("^<a><b"));
    }

    #[test]
    fn test_trailing_keys_rejected() {
        let section = relation_section("/a", "equal").with("extra", "1");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::TrailingProperty("extra".to_string())
        );

        // The end check comes before the pattern is compiled.
        let section = ConfigSection::new()
            .with("type", "name")
            .with("regex", "^<a><b")
            .with("name", "/a");
        assert_eq!(
            FilterCompiler::compile(&section).unwrap_err(),
            ConfigError::TrailingProperty("name".to_string())
        );
    }

    #[test]
    fn test_unquoted_quantifier_is_rejected() {
        let err =
            FilterCompiler::compile_policy("filter\n{\n  type name\n  regex ^<a>{2}\n}\n")
                .unwrap_err();
        assert_eq!(err, ConfigError::NestedSection("regex".to_string()));

        let policy =
            FilterCompiler::compile_policy("filter\n{\n  type name\n  regex \"^<a>{2}$\"\n}\n")
                .unwrap();
        let filter = &policy.filters()[0];
        assert!(filter.matches_data(&name("/a/a")));
        assert!(!filter.matches_data(&name("/a/x")));
    }

    #[test]
    fn test_nested_section_under_property() {
        for key in ["type", "name", "relation"] {
            let mut section = ConfigSection::new();
            for (k, v) in [("type", "name"), ("name", "/a"), ("relation", "equal")] {
                section = if k == key {
                    section.with_section(k, v, ConfigSection::new().with("x", "1"))
                } else {
                    section.with(k, v)
                };
            }
            assert_eq!(
                FilterCompiler::compile(&section).unwrap_err(),
                ConfigError::NestedSection(key.to_string())
            );
        }
    }

    #[test]
    fn test_compile_policy() {
        let policy = FilterCompiler::compile_policy(
            r#"
            filter
            {
              type name
              name /a
              relation equal
            }
            FILTER { type name
                     regex ^<b><>$ }
            "#,
        )
        .unwrap();

        assert_eq!(policy.len(), 2);
        assert_eq!(policy.first_match(Packet::Data(&name("/b/c"))), Some(1));

        let err = FilterCompiler::compile_policy("rule { id x }").unwrap_err();
        assert_eq!(err, ConfigError::UnexpectedEntry("rule".to_string()));

        let err = FilterCompiler::compile_policy("filter {").unwrap_err();
        assert!(matches!(err, ConfigError::Section(_)));
    }
}
