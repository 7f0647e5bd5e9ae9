//! Recursive comparison configuration.
//!
//! A [`RecursiveComparisonConfiguration`] is assembled with a fluent builder
//! and frozen by [`build`](RecursiveComparisonConfigurationBuilder::build),
//! which is where every configuration mistake surfaces (invalid regexes,
//! empty field paths). A built configuration is immutable and `Send + Sync`,
//! so one instance can be shared by concurrent comparisons.
//!
//! Field rules match on rule paths: dotted member names without indices, so
//! `books.title` applies to the title of every book.
//!
//! Configurations can also be loaded from a TOML [`ComparisonProfile`]:
//!
//! ```toml
//! strict_type_checking = true
//! ignored_fields = ["id", "address.zip"]
//! collection_policy = "collection_object_and_elements"
//! ```

use std::any::Any;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::accessor::IntrospectionStrategy;
use crate::comparator::{Comparator, FieldComparators, TypeComparators};
use crate::error::ConfigError;
use crate::graph::{Node, NodeRef, TypeKey};
use crate::path::{FieldPath, is_prefix_path};
use crate::policy::{CollectionAssertionPolicy, MapAssertionPolicy, OptionalAssertionPolicy};

/// Namespaces whose types are compared with `PartialEq` instead of member by
/// member, unless configured otherwise.
pub const DEFAULT_EQUALS_NAMESPACES: [&str; 3] = ["std::", "core::", "alloc::"];

/// Compiles `pattern` as a full match.
pub(crate) fn anchored(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

fn type_matches(pattern: &Regex, type_key: TypeKey) -> bool {
    pattern.is_match(type_key.name()) || pattern.is_match(&type_key.short_name())
}

/// How two object graphs are compared. See the module docs.
#[derive(Debug, Clone)]
pub struct RecursiveComparisonConfiguration {
    strict_type_checking: bool,
    ignore_all_actual_null_fields: bool,
    ignore_all_expected_null_fields: bool,
    ignore_all_actual_empty_optional_fields: bool,
    ignored_fields: BTreeSet<String>,
    ignored_field_patterns: Vec<Regex>,
    ignored_types: BTreeSet<TypeKey>,
    ignored_type_patterns: Vec<Regex>,
    compared_fields: Vec<String>,
    using_overridden_equals: bool,
    overridden_equals_ignored_types: BTreeSet<TypeKey>,
    overridden_equals_ignored_fields: BTreeSet<String>,
    overridden_equals_ignored_patterns: Vec<Regex>,
    type_comparators: TypeComparators,
    field_comparators: FieldComparators,
    field_messages: BTreeMap<String, String>,
    type_messages: BTreeMap<TypeKey, String>,
    ignore_all_collection_order: bool,
    ignored_collection_order_fields: BTreeSet<String>,
    ignored_collection_order_patterns: Vec<Regex>,
    treat_null_and_empty_iterables_as_equal: bool,
    allow_enum_against_string: bool,
    equals_namespaces: Vec<String>,
    collection_policy: CollectionAssertionPolicy,
    map_policy: MapAssertionPolicy,
    optional_policy: OptionalAssertionPolicy,
    introspection: IntrospectionStrategy,
}

impl Default for RecursiveComparisonConfiguration {
    fn default() -> Self {
        Self {
            strict_type_checking: false,
            ignore_all_actual_null_fields: false,
            ignore_all_expected_null_fields: false,
            ignore_all_actual_empty_optional_fields: false,
            ignored_fields: BTreeSet::new(),
            ignored_field_patterns: Vec::new(),
            ignored_types: BTreeSet::new(),
            ignored_type_patterns: Vec::new(),
            compared_fields: Vec::new(),
            using_overridden_equals: false,
            overridden_equals_ignored_types: BTreeSet::new(),
            overridden_equals_ignored_fields: BTreeSet::new(),
            overridden_equals_ignored_patterns: Vec::new(),
            type_comparators: TypeComparators::defaults(),
            field_comparators: FieldComparators::default(),
            field_messages: BTreeMap::new(),
            type_messages: BTreeMap::new(),
            ignore_all_collection_order: false,
            ignored_collection_order_fields: BTreeSet::new(),
            ignored_collection_order_patterns: Vec::new(),
            treat_null_and_empty_iterables_as_equal: false,
            allow_enum_against_string: false,
            equals_namespaces: DEFAULT_EQUALS_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            collection_policy: CollectionAssertionPolicy::default(),
            map_policy: MapAssertionPolicy::default(),
            optional_policy: OptionalAssertionPolicy::default(),
            introspection: IntrospectionStrategy::default(),
        }
    }
}

impl RecursiveComparisonConfiguration {
    pub fn builder() -> RecursiveComparisonConfigurationBuilder {
        RecursiveComparisonConfigurationBuilder::default()
    }

    /// Builds a configuration from a profile on top of the defaults.
    pub fn from_profile(profile: ComparisonProfile) -> Result<Self, ConfigError> {
        Self::builder().with_profile(profile).build()
    }

    /// A builder starting from this configuration.
    pub fn to_builder(&self) -> RecursiveComparisonConfigurationBuilder {
        RecursiveComparisonConfigurationBuilder {
            config: self.clone(),
            error: None,
        }
    }

    pub fn strict_type_checking(&self) -> bool {
        self.strict_type_checking
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

    pub fn compared_fields(&self) -> &[String] {
        &self.compared_fields
    }

    pub fn treats_null_and_empty_iterables_as_equal(&self) -> bool {
        self.treat_null_and_empty_iterables_as_equal
    }

    pub fn allows_enum_against_string(&self) -> bool {
        self.allow_enum_against_string
    }

    pub fn type_comparators(&self) -> &TypeComparators {
        &self.type_comparators
    }

    pub fn field_comparators(&self) -> &FieldComparators {
        &self.field_comparators
    }

    /// Whether the pair at `path` is skipped entirely. The root never is.
    /// An empty optional counts as a null field.
    pub fn should_ignore(&self, path: &FieldPath, actual: NodeRef<'_>, expected: NodeRef<'_>) -> bool {
        if path.is_root() {
            return false;
        }
        if self.ignore_all_actual_null_fields && actual.is_absent() {
            return true;
        }
        if self.ignore_all_expected_null_fields && expected.is_absent() {
            return true;
        }
        if self.ignore_all_actual_empty_optional_fields && actual.is_empty_optional() {
            return true;
        }
        let rule_path = path.rule_path();
        if self.is_ignored_field(&rule_path) {
            return true;
        }
        let typed = if actual.is_null() { expected } else { actual };
        !typed.is_null() && self.is_ignored_type(typed.type_key())
    }

    pub fn is_ignored_field(&self, rule_path: &str) -> bool {
        self.ignored_fields
            .iter()
            .any(|ignored| is_prefix_path(ignored, rule_path))
            || self
                .ignored_field_patterns
                .iter()
                .any(|pattern| pattern.is_match(rule_path))
    }

    pub fn is_ignored_type(&self, type_key: TypeKey) -> bool {
        self.ignored_types.contains(&type_key)
            || self
                .ignored_type_patterns
                .iter()
                .any(|pattern| type_matches(pattern, type_key))
    }

    /// Whether `rule_path` lies on the way to, or inside, a compared field.
    /// Always true when no compared fields are configured.
    pub fn is_compared(&self, rule_path: &str) -> bool {
        self.compared_fields.is_empty()
            || self
                .compared_fields
                .iter()
                .any(|field| crate::path::hierarchy_matches(rule_path, field))
    }

    /// Field comparators first, then type comparators along the actual and
    /// then the expected type chain.
    pub fn comparator_for(&self, rule_path: &str, actual: &Node, expected: &Node) -> Option<&Comparator> {
        self.field_comparators
            .comparator_for(rule_path)
            .or_else(|| self.type_comparators.comparator_for(actual))
            .or_else(|| self.type_comparators.comparator_for(expected))
    }

    /// Whether a bean carrying a payload is compared with its `PartialEq`.
    pub fn uses_overridden_equals(&self, rule_path: &str, node: &Node) -> bool {
        self.using_overridden_equals
            && node.payload.is_some()
            && !node
                .type_chain()
                .any(|key| self.overridden_equals_ignored_types.contains(&key))
            && !self.overridden_equals_ignored_fields.contains(rule_path)
            && !self
                .overridden_equals_ignored_patterns
                .iter()
                .any(|pattern| pattern.is_match(rule_path))
    }

    /// Whether values of this type are compared as a whole by `PartialEq`.
    pub fn compares_by_equals(&self, type_key: TypeKey) -> bool {
        self.equals_namespaces
            .iter()
            .any(|namespace| type_key.name().starts_with(namespace.as_str()))
    }

    pub fn ignores_collection_order(&self, rule_path: &str) -> bool {
        self.ignore_all_collection_order
            || self.ignored_collection_order_fields.contains(rule_path)
            || self
                .ignored_collection_order_patterns
                .iter()
                .any(|pattern| pattern.is_match(rule_path))
    }

    /// Custom failure message: field messages win over type messages.
    pub fn message_for(&self, rule_path: &str, node: &Node) -> Option<String> {
        self.field_messages
            .get(rule_path)
            .or_else(|| node.type_chain().find_map(|key| self.type_messages.get(&key)))
            .cloned()
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items.into_iter().collect::<Vec<_>>().join(", ")
}

fn join_patterns(patterns: &[Regex]) -> String {
    join(patterns.iter().map(Regex::as_str))
}

impl fmt::Display for RecursiveComparisonConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ignore_all_actual_null_fields {
            writeln!(f, "- all actual null fields were ignored in the comparison")?;
        }
        if self.ignore_all_expected_null_fields {
            writeln!(f, "- all expected null fields were ignored in the comparison")?;
        }
        if self.ignore_all_actual_empty_optional_fields {
            writeln!(f, "- all actual empty optional fields were ignored in the comparison")?;
        }
        if !self.compared_fields.is_empty() {
            let fields = join(self.compared_fields.iter().map(String::as_str));
            writeln!(f, "- the comparison was performed on the following fields: {fields}")?;
        }
        if !self.ignored_fields.is_empty() {
            let fields = join(self.ignored_fields.iter().map(String::as_str));
            writeln!(f, "- the following fields were ignored in the comparison: {fields}")?;
        }
        if !self.ignored_field_patterns.is_empty() {
            writeln!(
                f,
                "- the fields matching the following regexes were ignored in the comparison: {}",
                join_patterns(&self.ignored_field_patterns)
            )?;
        }
        if !self.ignored_types.is_empty() || !self.ignored_type_patterns.is_empty() {
            let names: Vec<String> = self
                .ignored_types
                .iter()
                .map(TypeKey::short_name)
                .chain(self.ignored_type_patterns.iter().map(|p| p.as_str().to_string()))
                .collect();
            writeln!(
                f,
                "- the following types were ignored in the comparison: {}",
                names.join(", ")
            )?;
        }
        if self.using_overridden_equals {
            writeln!(f, "- overridden equals were used in the comparison")?;
            if !self.overridden_equals_ignored_types.is_empty() {
                let names: Vec<String> = self
                    .overridden_equals_ignored_types
                    .iter()
                    .map(TypeKey::short_name)
                    .collect();
                writeln!(
                    f,
                    "- overridden equals were not used for the following types: {}",
                    names.join(", ")
                )?;
            }
            let mut fields: Vec<&str> = self
                .overridden_equals_ignored_fields
                .iter()
                .map(String::as_str)
                .collect();
            fields.extend(self.overridden_equals_ignored_patterns.iter().map(Regex::as_str));
            if !fields.is_empty() {
                writeln!(
                    f,
                    "- overridden equals were not used for the following fields: {}",
                    fields.join(", ")
                )?;
            }
        } else {
            writeln!(
                f,
                "- no overridden equals were used in the comparison (except for types in {})",
                join(self.equals_namespaces.iter().map(String::as_str))
            )?;
        }
        if self.ignore_all_collection_order {
            writeln!(f, "- collection order was ignored in all fields in the comparison")?;
        } else {
            let mut fields: Vec<&str> = self
                .ignored_collection_order_fields
                .iter()
                .map(String::as_str)
                .collect();
            fields.extend(self.ignored_collection_order_patterns.iter().map(Regex::as_str));
            if !fields.is_empty() {
                writeln!(
                    f,
                    "- collection order was ignored in the following fields in the comparison: {}",
                    fields.join(", ")
                )?;
            }
        }
        if self.treat_null_and_empty_iterables_as_equal {
            writeln!(f, "- null and empty collections were treated as equal")?;
        }
        if self.allow_enum_against_string {
            writeln!(f, "- enums were allowed to be compared against strings")?;
        }
        if !self.type_comparators.is_empty() {
            writeln!(f, "- these types were compared with the following comparators:")?;
            for (type_key, comparator) in self.type_comparators.iter() {
                writeln!(f, "  - {} -> {comparator}", type_key.short_name())?;
            }
        }
        if !self.field_comparators.is_empty() {
            writeln!(f, "- these fields were compared with the following comparators:")?;
            for (field, comparator) in self.field_comparators.iter() {
                writeln!(f, "  - {field} -> {comparator}")?;
            }
        }
        if !self.field_messages.is_empty() || !self.type_messages.is_empty() {
            writeln!(f, "- these fields had overridden error messages:")?;
            for field in self.field_messages.keys() {
                writeln!(f, "  - {field}")?;
            }
            for type_key in self.type_messages.keys() {
                writeln!(f, "  - {}", type_key.short_name())?;
            }
        }
        if self.strict_type_checking {
            writeln!(
                f,
                "- actual and expected objects and their fields were compared field by field recursively \
                 and their types were required to match"
            )?;
        } else {
            writeln!(
                f,
                "- actual and expected objects and their fields were compared field by field recursively \
                 even if they were not of the same type"
            )?;
        }
        writeln!(
            f,
            "- collections were compared with the {} policy, maps with the {} policy and optionals with the {} policy",
            self.collection_policy, self.map_policy, self.optional_policy
        )
    }
}

/// Fluent builder for [`RecursiveComparisonConfiguration`].
///
/// Every option records its input; invalid input is reported by
/// [`build`](Self::build), first error wins.
#[derive(Debug, Default)]
pub struct RecursiveComparisonConfigurationBuilder {
    config: RecursiveComparisonConfiguration,
    error: Option<ConfigError>,
}

impl RecursiveComparisonConfigurationBuilder {
    fn fail(&mut self, error: ConfigError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn paths<I, S>(&mut self, option: &'static str, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.iter().any(|p| p.trim().is_empty()) {
            self.fail(ConfigError::EmptyFieldPath { option });
        }
        paths
    }

    fn patterns<I, S>(&mut self, patterns: I) -> Vec<Regex>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            match anchored(&pattern.into()) {
                Ok(regex) => compiled.push(regex),
                Err(error) => self.fail(error),
            }
        }
        compiled
    }

    /// Requires actual and expected runtime types to match at every node.
    pub fn with_strict_type_checking(mut self, strict: bool) -> Self {
        self.config.strict_type_checking = strict;
        self
    }

    pub fn ignoring_all_actual_null_fields(mut self) -> Self {
        self.config.ignore_all_actual_null_fields = true;
        self
    }

    pub fn ignoring_all_expected_null_fields(mut self) -> Self {
        self.config.ignore_all_expected_null_fields = true;
        self
    }

    pub fn ignoring_all_actual_empty_optional_fields(mut self) -> Self {
        self.config.ignore_all_actual_empty_optional_fields = true;
        self
    }

    /// Ignores the given fields and everything below them.
    pub fn ignoring_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = self.paths("ignoring_fields", fields);
        self.config.ignored_fields.extend(fields);
        self
    }

    pub fn ignoring_fields_matching_regexes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = self.patterns(patterns);
        self.config.ignored_field_patterns.extend(patterns);
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

    /// Regexes over type names (full or without module path).
    pub fn ignoring_fields_of_types_matching_regexes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = self.patterns(patterns);
        self.config.ignored_type_patterns.extend(patterns);
        self
    }

    /// Restricts the comparison to the given fields (their parents are
    /// traversed, their children compared).
    pub fn comparing_only_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = self.paths("comparing_only_fields", fields);
        self.config.compared_fields.extend(fields);
        self
    }

    /// Compares beans that carry a payload with their own `PartialEq`.
    pub fn using_overridden_equals(mut self) -> Self {
        self.config.using_overridden_equals = true;
        self
    }

    pub fn ignoring_overridden_equals_for_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = TypeKey>,
    {
        self.config.overridden_equals_ignored_types.extend(types);
        self
    }

    pub fn ignoring_overridden_equals_for_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = self.paths("ignoring_overridden_equals_for_fields", fields);
        self.config.overridden_equals_ignored_fields.extend(fields);
        self
    }

    pub fn ignoring_overridden_equals_for_fields_matching_regexes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = self.patterns(patterns);
        self.config.overridden_equals_ignored_patterns.extend(patterns);
        self
    }

    /// Registers a comparator for a type key, replacing any earlier one.
    pub fn with_type_comparator(mut self, type_key: TypeKey, comparator: Comparator) -> Self {
        self.config.type_comparators.register(type_key, comparator);
        self
    }

    pub fn with_comparator_for_type<T, F>(self, compare: F) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let description = format!("comparator for {}", TypeKey::of::<T>().short_name());
        self.with_type_comparator(TypeKey::of::<T>(), Comparator::ordering(description, compare))
    }

    pub fn with_equals_for_type<T, F>(self, equals: F) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let description = format!("equals for {}", TypeKey::of::<T>().short_name());
        self.with_type_comparator(TypeKey::of::<T>(), Comparator::equals(description, equals))
    }

    pub fn with_comparator_for_fields<I, S>(mut self, comparator: Comparator, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in self.paths("with_comparator_for_fields", fields) {
            self.config.field_comparators.register(field, comparator.clone());
        }
        self
    }

    pub fn with_equals_for_fields<T, F, I, S>(self, equals: F, fields: I) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let description = format!("equals for {}", TypeKey::of::<T>().short_name());
        self.with_comparator_for_fields(Comparator::equals(description, equals), fields)
    }

    pub fn with_comparator_for_fields_matching_regexes<I, S>(
        mut self,
        comparator: Comparator,
        patterns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for pattern in self.patterns(patterns) {
            self.config
                .field_comparators
                .register_pattern(pattern, comparator.clone());
        }
        self
    }

    pub fn with_equals_for_fields_matching_regexes<T, F, I, S>(self, equals: F, patterns: I) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let description = format!("equals for {}", TypeKey::of::<T>().short_name());
        self.with_comparator_for_fields_matching_regexes(Comparator::equals(description, equals), patterns)
    }

    pub fn with_error_message_for_fields<I, S>(mut self, message: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = message.into();
        for field in self.paths("with_error_message_for_fields", fields) {
            self.config.field_messages.insert(field, message.clone());
        }
        self
    }

    pub fn with_error_message_for_type<T: ?Sized>(mut self, message: impl Into<String>) -> Self {
        self.config
            .type_messages
            .insert(TypeKey::of::<T>(), message.into());
        self
    }

    pub fn ignoring_collection_order(mut self) -> Self {
        self.config.ignore_all_collection_order = true;
        self
    }

    pub fn ignoring_collection_order_in_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = self.paths("ignoring_collection_order_in_fields", fields);
        self.config.ignored_collection_order_fields.extend(fields);
        self
    }

    pub fn ignoring_collection_order_in_fields_matching_regexes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = self.patterns(patterns);
        self.config.ignored_collection_order_patterns.extend(patterns);
        self
    }

    pub fn treating_null_and_empty_iterables_as_equal(mut self) -> Self {
        self.config.treat_null_and_empty_iterables_as_equal = true;
        self
    }

    pub fn allowing_enum_against_string(mut self, allowed: bool) -> Self {
        self.config.allow_enum_against_string = allowed;
        self
    }

    /// Adds namespaces (type name prefixes such as `chrono::`) whose types
    /// are compared as a whole.
    pub fn comparing_types_in_namespaces_by_equals<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let namespaces = self.paths("comparing_types_in_namespaces_by_equals", namespaces);
        for namespace in namespaces {
            if !self.config.equals_namespaces.contains(&namespace) {
                self.config.equals_namespaces.push(namespace);
            }
        }
        self
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

    /// Applies every option set in `profile`.
    pub fn with_profile(self, profile: ComparisonProfile) -> Self {
        profile.apply(self)
    }

    pub fn build(self) -> Result<RecursiveComparisonConfiguration, ConfigError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.config),
        }
    }
}

/// Comparison options read from a TOML file.
///
/// Type names in `ignored_types` are matched literally against full or short
/// type names; `ignored_types_matching_regexes` takes regexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonProfile {
    pub strict_type_checking: bool,
    pub ignore_all_actual_null_fields: bool,
    pub ignore_all_expected_null_fields: bool,
    pub ignore_all_actual_empty_optional_fields: bool,
    pub ignored_fields: Vec<String>,
    pub ignored_fields_matching_regexes: Vec<String>,
    pub ignored_types: Vec<String>,
    pub ignored_types_matching_regexes: Vec<String>,
    pub compared_fields: Vec<String>,
    pub using_overridden_equals: bool,
    pub ignore_collection_order: bool,
    pub ignored_collection_order_in_fields: Vec<String>,
    pub ignored_collection_order_in_fields_matching_regexes: Vec<String>,
    pub treat_null_and_empty_iterables_as_equal: bool,
    pub allow_enum_against_string: bool,
    pub compared_by_equals_namespaces: Vec<String>,
    pub collection_policy: Option<CollectionAssertionPolicy>,
    pub map_policy: Option<MapAssertionPolicy>,
    pub optional_policy: Option<OptionalAssertionPolicy>,
    pub include_private_fields: Option<bool>,
}

impl ComparisonProfile {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseProfile { source })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadProfile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn apply(
        self,
        builder: RecursiveComparisonConfigurationBuilder,
    ) -> RecursiveComparisonConfigurationBuilder {
        let mut builder = builder;
        if self.strict_type_checking {
            builder = builder.with_strict_type_checking(true);
        }
        if self.ignore_all_actual_null_fields {
            builder = builder.ignoring_all_actual_null_fields();
        }
        if self.ignore_all_expected_null_fields {
            builder = builder.ignoring_all_expected_null_fields();
        }
        if self.ignore_all_actual_empty_optional_fields {
            builder = builder.ignoring_all_actual_empty_optional_fields();
        }
        if self.using_overridden_equals {
            builder = builder.using_overridden_equals();
        }
        if self.ignore_collection_order {
            builder = builder.ignoring_collection_order();
        }
        if self.treat_null_and_empty_iterables_as_equal {
            builder = builder.treating_null_and_empty_iterables_as_equal();
        }
        if self.allow_enum_against_string {
            builder = builder.allowing_enum_against_string(true);
        }
        let literal_types = self.ignored_types.iter().map(|name| regex::escape(name));
        builder = builder
            .ignoring_fields(self.ignored_fields)
            .ignoring_fields_matching_regexes(self.ignored_fields_matching_regexes)
            .ignoring_fields_of_types_matching_regexes(literal_types)
            .ignoring_fields_of_types_matching_regexes(self.ignored_types_matching_regexes)
            .comparing_only_fields(self.compared_fields)
            .ignoring_collection_order_in_fields(self.ignored_collection_order_in_fields)
            .ignoring_collection_order_in_fields_matching_regexes(
                self.ignored_collection_order_in_fields_matching_regexes,
            )
            .comparing_types_in_namespaces_by_equals(self.compared_by_equals_namespaces);
        if let Some(policy) = self.collection_policy {
            builder = builder.with_collection_policy(policy);
        }
        if let Some(policy) = self.map_policy {
            builder = builder.with_map_policy(policy);
        }
        if let Some(policy) = self.optional_policy {
            builder = builder.with_optional_policy(policy);
        }
        if let Some(include_private) = self.include_private_fields {
            builder = builder.with_introspection_strategy(IntrospectionStrategy { include_private });
        }
        builder
    }
}
