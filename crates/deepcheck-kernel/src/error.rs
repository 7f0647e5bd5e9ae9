//! Error types for deepcheck kernel operations.
//!
//! A failed comparison is not an error: it is a non-empty list of
//! [`ComparisonDifference`](crate::difference::ComparisonDifference)s. The
//! types here cover caller mistakes (unknown fields, malformed paths, bad
//! configuration) that must surface before or instead of a walk.

/// Errors raised while navigating a snapshot by field or property name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntrospectionError {
    /// Neither a property nor a field with this name exists on the runtime type.
    #[error("unable to find property or field `{name}` on `{type_name}`")]
    UnknownMember { name: String, type_name: String },

    /// The member exists but is private and private members are hidden.
    #[error("field `{name}` on `{type_name}` is private and private fields are not visible")]
    PrivateMember { name: String, type_name: String },

    /// An index segment points past the end of a sequence.
    #[error("index {index} is out of bounds for `{type_name}` of length {len}")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        type_name: String,
    },

    /// The value has no children to navigate into.
    #[error("cannot resolve `{segment}` on `{type_name}`: it has no fields")]
    NotNavigable { segment: String, type_name: String },

    /// The path expression could not be parsed.
    #[error("malformed path `{0}`")]
    MalformedPath(String),
}

/// Errors raised while building a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{option} requires non-empty field paths")]
    EmptyFieldPath { option: &'static str },

    #[error("failed to read profile: {path}: {source}")]
    ReadProfile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml profile: {source}")]
    ParseProfile {
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown {family} policy `{value}`")]
    UnknownPolicy { family: &'static str, value: String },
}

/// Errors raised by the comparison engine before it can produce differences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    /// A field given to `comparing_only_fields` does not exist on the actual value.
    #[error("compared field `{field}` does not exist on the actual value: {source}")]
    ComparedFieldNotFound {
        field: String,
        #[source]
        source: IntrospectionError,
    },
}
