//! Field paths.
//!
//! A [`FieldPath`] records how a node was reached from the root. It renders
//! to an accessor expression (`books[1].authors[0].name`) that
//! [`PropertyAccessor::resolve`](crate::accessor::PropertyAccessor::resolve)
//! accepts, and to a rule path (`books.authors.name`) without indices, which
//! is what ignore rules and field comparators match against.
//!
//! Map keys that are not plain names (empty, or containing whitespace, `.`,
//! `[`, `]`, `"` or `\`) render in quoted bracket form, `limits["a.b"]`, so every
//! rendered path names exactly one node. Rule paths keep the raw key.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::IntrospectionError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A bean member, or the content of an optional (`value`).
    Field(String),
    Index(usize),
    Key(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

/// One token of an accessor expression: a bare name, `[n]` or `["key"]`.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(?:(?P<name>[^.\[\]"\\]+)|\[(?P<index>\d+)\]|\["(?P<key>(?:[^"\\]|\\.)*)"\])"#)
            .expect("token regex must compile")
    })
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || matches!(c, '.' | '[' | ']' | '"' | '\\'))
}

fn quote(name: &str, out: &mut String) {
    out.push_str("[\"");
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push_str("\"]");
}

fn unquote(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `a.b[0].c` and `m["a.b"]`. Bare names are parsed as fields;
    /// the accessor treats them as keys when it meets a map.
    pub fn parse(expression: &str) -> Result<Self, IntrospectionError> {
        let malformed = || IntrospectionError::MalformedPath(expression.to_string());
        if expression.trim().is_empty() {
            return Err(malformed());
        }
        let mut segments = Vec::new();
        let mut rest = expression;
        let mut after_dot = false;
        while !rest.is_empty() {
            let captures = token_pattern().captures(rest).ok_or_else(malformed)?;
            if let Some(name) = captures.name("name") {
                if !segments.is_empty() && !after_dot {
                    return Err(malformed());
                }
                segments.push(Segment::Field(name.as_str().to_string()));
            } else if after_dot {
                return Err(malformed());
            } else if let Some(index) = captures.name("index") {
                let index = index.as_str().parse::<usize>().map_err(|_| malformed())?;
                segments.push(Segment::Index(index));
            } else if let Some(key) = captures.name("key") {
                segments.push(Segment::Key(unquote(key.as_str())));
            }
            rest = &rest[captures[0].len()..];
            after_dot = match rest.strip_prefix('.') {
                Some("") => return Err(malformed()),
                Some(tail) => {
                    rest = tail;
                    true
                }
                None => false,
            };
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    pub fn field(&self, name: &str) -> Self {
        self.child(Segment::Field(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(Segment::Key(key.to_string()))
    }

    /// The accessor expression, empty for the root.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Field(name) | Segment::Key(name) if is_plain_name(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Field(name) | Segment::Key(name) => quote(name, &mut out),
                Segment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    /// Dotted names without indices, used to match configuration rules.
    pub fn rule_path(&self) -> String {
        let names: Vec<&str> = self
            .segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Field(name) | Segment::Key(name) => Some(name.as_str()),
                Segment::Index(_) => None,
            })
            .collect();
        names.join(".")
    }

    /// The last named segment, if any.
    pub fn last_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            Segment::Field(name) | Segment::Key(name) => Some(name.as_str()),
            Segment::Index(_) => None,
        })
    }
}

/// Whether `rule_path` is `rule`, one of its ancestors or one of its
/// descendants. Dotted paths only match on whole segments.
pub fn hierarchy_matches(rule_path: &str, rule: &str) -> bool {
    is_prefix_path(rule_path, rule) || is_prefix_path(rule, rule_path)
}

/// Whether `prefix` names `path` or one of its ancestors.
pub fn is_prefix_path(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}
