//! Regular expressions over names.
//!
//! Patterns describe a sequence of components rather than a string:
//!
//! - `<re>` matches one component whose URI form fully matches `re`
//!   (a [`regex`] pattern); `<>` matches any component
//! - `[<a><b>]` matches one component matching any listed pattern,
//!   `[^<a><b>]` one matching none of them
//! - `( ... )` groups a sub-sequence
//! - `*`, `+`, `?`, `{n}`, `{n,}`, `{,m}` and `{n,m}` repeat the preceding element
//! - a leading `^` / trailing `$` anchor the match to the first / last component
//!
//! Matching tracks the set of reachable component positions, so evaluation
//! never backtracks.

use crate::error::PatternError;
use crate::name::{Component, Name};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// A compiled name pattern.
#[derive(Debug, Clone)]
pub struct NameRegex {
    pattern: String,
    anchored_start: bool,
    anchored_end: bool,
    sequence: Vec<Node>,
}

#[derive(Debug, Clone)]
struct Node {
    atom: Atom,
    min: usize,
    max: Option<usize>,
}

#[derive(Debug, Clone)]
enum Atom {
    Component(ComponentPattern),
    Set {
        negated: bool,
        members: Vec<ComponentPattern>,
    },
    Group(Vec<Node>),
}

#[derive(Debug, Clone)]
enum ComponentPattern {
    Any,
    Regex(Regex),
}

type Positions = BTreeSet<usize>;

impl NameRegex {
    /// Compile a name pattern.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut body = pattern;

        let anchored_start = match body.strip_prefix('^') {
            Some(rest) => {
                body = rest;
                true
            }
            None => false,
        };
        let anchored_end = match body.strip_suffix('$') {
            Some(rest) => {
                body = rest;
                true
            }
            None => false,
        };

        let mut parser = Parser {
            pattern,
            body,
            pos: 0,
        };
        let sequence = parser.parse_sequence(0)?;

        Ok(Self {
            pattern: pattern.to_string(),
            anchored_start,
            anchored_end,
            sequence,
        })
    }

    /// The pattern text this regex was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test whether `name` is accepted by this pattern.
    pub fn is_match(&self, name: &Name) -> bool {
        let components: Vec<String> = name.components().iter().map(Component::to_uri).collect();
        let len = components.len();

        let starts: Positions = if self.anchored_start {
            Positions::from([0])
        } else {
            (0..=len).collect()
        };

        let ends = advance_sequence(&self.sequence, &components, starts);
        if self.anchored_end {
            ends.contains(&len)
        } else {
            !ends.is_empty()
        }
    }
}

impl fmt::Display for NameRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn advance_sequence(nodes: &[Node], components: &[String], positions: Positions) -> Positions {
    nodes.iter().fold(positions, |current, node| {
        if current.is_empty() {
            current
        } else {
            node.advance(components, &current)
        }
    })
}

impl Node {
    fn advance(&self, components: &[String], positions: &Positions) -> Positions {
        let mut reached = Positions::new();
        if self.min == 0 {
            reached.extend(positions.iter().copied());
        }

        let mut frontier = positions.clone();
        let mut count = 0usize;

        while self.max.map_or(true, |max| count < max) {
            let next = self.atom.step(components, &frontier);
            count += 1;

            if next.is_empty() {
                break;
            }
            // Fixed point: every further repetition yields the same set.
            if next == frontier {
                reached.extend(next);
                break;
            }
            if count >= self.min {
                let before = reached.len();
                reached.extend(next.iter().copied());
                if reached.len() == before {
                    break;
                }
            }
            frontier = next;
        }

        reached
    }
}

impl Atom {
    fn step(&self, components: &[String], frontier: &Positions) -> Positions {
        match self {
            Atom::Component(pattern) => frontier
                .iter()
                .filter(|&&pos| components.get(pos).is_some_and(|c| pattern.matches(c)))
                .map(|&pos| pos + 1)
                .collect(),
            Atom::Set { negated, members } => frontier
                .iter()
                .filter(|&&pos| {
                    components
                        .get(pos)
                        .is_some_and(|c| members.iter().any(|m| m.matches(c)) != *negated)
                })
                .map(|&pos| pos + 1)
                .collect(),
            Atom::Group(inner) => advance_sequence(inner, components, frontier.clone()),
        }
    }
}

impl ComponentPattern {
    fn matches(&self, component: &str) -> bool {
        match self {
            ComponentPattern::Any => true,
            ComponentPattern::Regex(re) => re.is_match(component),
        }
    }
}

struct Parser<'p> {
    pattern: &'p str,
    body: &'p str,
    pos: usize,
}

impl<'p> Parser<'p> {
    fn error(&self, reason: impl Into<String>) -> PatternError {
        PatternError::new(self.pattern, reason)
    }

    fn peek(&self) -> Option<u8> {
        self.body.as_bytes().get(self.pos).copied()
    }

    fn parse_sequence(&mut self, depth: usize) -> Result<Vec<Node>, PatternError> {
        let mut nodes = Vec::new();

        while let Some(c) = self.peek() {
            let atom = match c {
                b'<' => Atom::Component(self.parse_component()?),
                b'[' => self.parse_set()?,
                b'(' => {
                    self.pos += 1;
                    let inner = self.parse_sequence(depth + 1)?;
                    if self.peek() != Some(b')') {
                        return Err(self.error("unbalanced '('"));
                    }
                    self.pos += 1;
                    Atom::Group(inner)
                }
                b')' if depth > 0 => return Ok(nodes),
                b')' => return Err(self.error("unbalanced ')'")),
                b'*' | b'+' | b'?' | b'{' => {
                    return Err(self.error(format!(
                        "repetition '{}' at offset {} has nothing to repeat",
                        char::from(c),
                        self.pos
                    )))
                }
                b'^' => return Err(self.error("'^' is only allowed at the start")),
                b'$' => return Err(self.error("'$' is only allowed at the end")),
                _ => {
                    let unexpected = self.body[self.pos..].chars().next().unwrap_or('?');
                    return Err(self.error(format!(
                        "unexpected '{}' at offset {}",
                        unexpected, self.pos
                    )));
                }
            };

            let (min, max) = self.parse_repetition()?;
            nodes.push(Node { atom, min, max });
        }

        Ok(nodes)
    }

    fn parse_component(&mut self) -> Result<ComponentPattern, PatternError> {
        let start = self.pos + 1;
        let end = self.body[start..]
            .find('>')
            .map(|offset| start + offset)
            .ok_or_else(|| self.error("unterminated '<'"))?;
        self.pos = end + 1;

        let text = &self.body[start..end];
        if text.is_empty() {
            return Ok(ComponentPattern::Any);
        }

        Regex::new(&format!("^(?:{})$", text))
            .map(ComponentPattern::Regex)
            .map_err(|e| self.error(format!("invalid component pattern <{}>: {}", text, e)))
    }

    fn parse_set(&mut self) -> Result<Atom, PatternError> {
        self.pos += 1;
        let negated = self.peek() == Some(b'^');
        if negated {
            self.pos += 1;
        }

        let mut members = Vec::new();
        loop {
            match self.peek() {
                Some(b'<') => members.push(self.parse_component()?),
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(self.error("only <...> elements may appear inside [...]")),
                None => return Err(self.error("unterminated '['")),
            }
        }

        if members.is_empty() {
            return Err(self.error("empty component set"));
        }

        Ok(Atom::Set { negated, members })
    }

    fn parse_repetition(&mut self) -> Result<(usize, Option<usize>), PatternError> {
        let bounds = match self.peek() {
            Some(b'*') => (0, None),
            Some(b'+') => (1, None),
            Some(b'?') => (0, Some(1)),
            Some(b'{') => return self.parse_bounds(),
            _ => return Ok((1, Some(1))),
        };
        self.pos += 1;
        Ok(bounds)
    }

    fn parse_bounds(&mut self) -> Result<(usize, Option<usize>), PatternError> {
        let start = self.pos + 1;
        let end = self.body[start..]
            .find('}')
            .map(|offset| start + offset)
            .ok_or_else(|| self.error("unterminated '{'"))?;
        self.pos = end + 1;

        let text = &self.body[start..end];
        let parse = |s: &str| -> Result<Option<usize>, PatternError> {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<usize>()
                .map(Some)
                .map_err(|_| self.error(format!("invalid repetition bounds {{{}}}", text)))
        };

        let (min, max) = match text.split_once(',') {
            Some((lo, hi)) => {
                let lo = parse(lo)?;
                let hi = parse(hi)?;
                if lo.is_none() && hi.is_none() {
                    return Err(self.error("empty repetition bounds {,}"));
                }
                (lo.unwrap_or(0), hi)
            }
            None => match parse(text)? {
                Some(n) => (n, Some(n)),
                None => return Err(self.error("empty repetition bounds {}")),
            },
        };

        if let Some(max) = max {
            if min > max {
                return Err(self.error(format!("inverted repetition bounds {{{}}}", text)));
            }
        }

        Ok((min, max))
    }
}
