//! Recursive assertion configuration.
//!
//! Controls which nodes the single-graph walker applies its predicate to
//! and which nodes it descends into. Built like the comparison
//! configuration: options are recorded by a builder and validated by
//! [`build`](RecursiveAssertionConfigurationBuilder::build).

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;

use crate::accessor::IntrospectionStrategy;
use crate::config::{DEFAULT_EQUALS_NAMESPACES, anchored};
use crate::error::ConfigError;
use crate::graph::{NodeKind, NodeRef, TypeKey};
use crate::path::{FieldPath, is_prefix_path};
use crate::policy::{CollectionAssertionPolicy, MapAssertionPolicy, OptionalAssertionPolicy};

const PRIMITIVE_TYPES: [&str; 17] = [
    "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128",
    "usize", "f32", "f64", "()",
];

#[derive(Debug, Clone)]
pub struct RecursiveAssertionConfiguration {
    ignore_all_null_fields: bool,
    ignore_all_empty_optional_fields: bool,
    ignore_primitive_fields: bool,
    skip_library_types: bool,
    library_namespaces: Vec<String>,
    ignored_fields: BTreeSet<String>,
    ignored_field_patterns: Vec<Regex>,
    ignored_types: BTreeSet<TypeKey>,
    collection_policy: CollectionAssertionPolicy,
    map_policy: MapAssertionPolicy,
    optional_policy: OptionalAssertionPolicy,
    introspection: IntrospectionStrategy,
}

impl Default for RecursiveAssertionConfiguration {
    fn default() -> Self {
        Self {
            ignore_all_null_fields: false,
            ignore_all_empty_optional_fields: false,
            ignore_primitive_fields: false,
            skip_library_types: true,
            library_namespaces: DEFAULT_EQUALS_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            ignored_fields: BTreeSet::new(),
            ignored_field_patterns: Vec::new(),
            ignored_types: BTreeSet::new(),
            collection_policy: CollectionAssertionPolicy::default(),
            map_policy: MapAssertionPolicy::default(),
            optional_policy: OptionalAssertionPolicy::default(),
            introspection: IntrospectionStrategy::default(),
        }
    }
}

impl RecursiveAssertionConfiguration {
    pub fn builder() -> RecursiveAssertionConfigurationBuilder {
        RecursiveAssertionConfigurationBuilder::default()
    }

    pub fn to_builder(&self) -> RecursiveAssertionConfigurationBuilder {
        RecursiveAssertionConfigurationBuilder {
            config: self.clone(),
            error: None,
        }
    }

    pub fn collection_policy(&self) -> CollectionAssertionPolicy {
        self.collection_policy
    }

    pub fn map_policy(&self) -> MapAssertionPolicy {
        self.map_policy
    }

    pub fn optional_policy(&self) -> OptionalAssertionPolicy {
        self.optional_policy
    }

    pub fn introspection_strategy(&self) -> IntrospectionStrategy {
        self.introspection
    }

    /// Whether the node at `path` is neither tested nor descended into.
    pub fn should_ignore(&self, path: &FieldPath, node: NodeRef<'_>) -> bool {
        if path.is_root() {
            return false;
        }
        if self.ignore_all_null_fields && node.is_absent() {
            return true;
        }
        if self.ignore_all_empty_optional_fields && node.is_empty_optional() {
            return true;
        }
        if self.ignore_primitive_fields && is_primitive(node) {
            return true;
        }
        let rule_path = path.rule_path();
        if self
            .ignored_fields
            .iter()
            .any(|ignored| is_prefix_path(ignored, &rule_path))
            || self
                .ignored_field_patterns
                .iter()
                .any(|pattern| pattern.is_match(&rule_path))
        {
            return true;
        }
        !node.is_null() && self.ignored_types.contains(&node.type_key())
    }

    /// Whether the walker descends into the members of this bean.
    pub fn recurses_into(&self, node: NodeRef<'_>) -> bool {
        !(self.skip_library_types
            && self
                .library_namespaces
                .iter()
                .any(|namespace| node.type_key().name().starts_with(namespace.as_str())))
    }
}

fn is_primitive(node: NodeRef<'_>) -> bool {
    matches!(node.kind(), NodeKind::Leaf) && PRIMITIVE_TYPES.contains(&node.type_key().name())
}

impl fmt::Display for RecursiveAssertionConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ignore_all_null_fields {
            writeln!(f, "- all null fields were ignored in the assertion")?;
        }
        if self.ignore_all_empty_optional_fields {
            writeln!(f, "- all empty optional fields were ignored in the assertion")?;
        }
        if self.ignore_primitive_fields {
            writeln!(f, "- primitive fields were ignored in the assertion")?;
        }
        if !self.ignored_fields.is_empty() {
            let fields: Vec<&str> = self.ignored_fields.iter().map(String::as_str).collect();
            writeln!(f, "- the following fields were ignored in the assertion: {}", fields.join(", "))?;
        }
        if !self.ignored_field_patterns.is_empty() {
            let patterns: Vec<&str> = self.ignored_field_patterns.iter().map(Regex::as_str).collect();
            writeln!(
                f,
                "- the fields matching the following regexes were ignored in the assertion: {}",
                patterns.join(", ")
            )?;
        }
        if !self.ignored_types.is_empty() {
            let types: Vec<String> = self.ignored_types.iter().map(TypeKey::short_name).collect();
            writeln!(f, "- the following types were ignored in the assertion: {}", types.join(", "))?;
        }
        if self.skip_library_types {
            writeln!(
                f,
                "- the assertion did not recurse into types in {}",
                self.library_namespaces.join(", ")
            )?;
        }
        writeln!(
            f,
            "- collections were traversed with the {} policy, maps with the {} policy and optionals with the {} policy",
            self.collection_policy, self.map_policy, self.optional_policy
        )
    }
}

#[derive(Debug, Default)]
pub struct RecursiveAssertionConfigurationBuilder {
    config: RecursiveAssertionConfiguration,
    error: Option<ConfigError>,
}

impl RecursiveAssertionConfigurationBuilder {
    pub fn ignoring_all_null_fields(mut self) -> Self {
        self.config.ignore_all_null_fields = true;
        self
    }

    pub fn ignoring_all_empty_optional_fields(mut self) -> Self {
        self.config.ignore_all_empty_optional_fields = true;
        self
    }

    /// Skips leaves of primitive types (`bool`, `char`, numbers).
    pub fn ignoring_primitive_fields(mut self) -> Self {
        self.config.ignore_primitive_fields = true;
        self
    }

    /// Whether std/core/alloc types are treated as opaque (default `true`).
    pub fn skipping_library_types(mut self, skip: bool) -> Self {
        self.config.skip_library_types = skip;
        self
    }

    pub fn ignoring_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if field.trim().is_empty() && self.error.is_none() {
                self.error = Some(ConfigError::EmptyFieldPath {
                    option: "ignoring_fields",
                });
            }
            self.config.ignored_fields.insert(field);
        }
        self
    }

    pub fn ignoring_fields_matching_regexes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in patterns {
            match anchored(&pattern.into()) {
                Ok(regex) => self.config.ignored_field_patterns.push(regex),
                Err(error) => {
                    self.error.get_or_insert(error);
                }
            }
        }
        self
    }

    pub fn ignoring_fields_of_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = TypeKey>,
    {
        self.config.ignored_types.extend(types);
        self
    }

    pub fn ignoring_fields_of_type<T: ?Sized>(self) -> Self {
        self.ignoring_fields_of_types([TypeKey::of::<T>()])
    }

    pub fn with_collection_policy(mut self, policy: CollectionAssertionPolicy) -> Self {
        self.config.collection_policy = policy;
        self
    }

    pub fn with_map_policy(mut self, policy: MapAssertionPolicy) -> Self {
        self.config.map_policy = policy;
        self
    }

    pub fn with_optional_policy(mut self, policy: OptionalAssertionPolicy) -> Self {
        self.config.optional_policy = policy;
        self
    }

    pub fn with_introspection_strategy(mut self, strategy: IntrospectionStrategy) -> Self {
        self.config.introspection = strategy;
        self
    }

    pub fn build(self) -> Result<RecursiveAssertionConfiguration, ConfigError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.config),
        }
    }
}
