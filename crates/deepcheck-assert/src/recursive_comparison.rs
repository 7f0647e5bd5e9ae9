//! `assert_that(&actual).using_recursive_comparison()`.
//!
//! Options are recorded on a configuration builder; the configuration is
//! validated when a terminal method (`is_equal_to`, `try_is_equal_to`,
//! `is_not_equal_to`) runs, so a bad regex surfaces as
//! [`AssertionError::Configuration`] before any comparison.

use std::any::Any;
use std::cmp::Ordering;

use deepcheck_kernel::report::render_failure;
use deepcheck_kernel::{
    CollectionAssertionPolicy, Comparator, ComparisonDifference, ComparisonProfile, Introspect, MapAssertionPolicy,
    OptionalAssertionPolicy, RecursiveComparator, RecursiveComparisonConfiguration,
    RecursiveComparisonConfigurationBuilder, Snapshot, TypeKey, represent,
};
use tracing::debug;

use crate::error::AssertionError;

pub struct RecursiveComparisonAssert<'a, T: ?Sized> {
    actual: &'a T,
    description: Option<String>,
    builder: RecursiveComparisonConfigurationBuilder,
}

impl<'a, T: Introspect + ?Sized> RecursiveComparisonAssert<'a, T> {
    pub(crate) fn new(
        actual: &'a T,
        description: Option<String>,
        builder: RecursiveComparisonConfigurationBuilder,
    ) -> Self {
        Self {
            actual,
            description,
            builder,
        }
    }

    fn map(
        mut self,
        f: impl FnOnce(RecursiveComparisonConfigurationBuilder) -> RecursiveComparisonConfigurationBuilder,
    ) -> Self {
        self.builder = f(self.builder);
        self
    }

    /// Applies any builder option not mirrored here.
    pub fn configured_by(
        self,
        f: impl FnOnce(RecursiveComparisonConfigurationBuilder) -> RecursiveComparisonConfigurationBuilder,
    ) -> Self {
        self.map(f)
    }

    pub fn with_strict_type_checking(self) -> Self {
        self.map(|b| b.with_strict_type_checking(true))
    }

    pub fn ignoring_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.ignoring_fields(fields))
    }

    pub fn ignoring_fields_matching_regexes<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.ignoring_fields_matching_regexes(patterns))
    }

    pub fn ignoring_fields_of_types<I>(self, types: I) -> Self
    where
        I: IntoIterator<Item = TypeKey>,
    {
        self.map(|b| b.ignoring_fields_of_types(types))
    }

    pub fn ignoring_all_actual_null_fields(self) -> Self {
        self.map(|b| b.ignoring_all_actual_null_fields())
    }

    pub fn ignoring_all_expected_null_fields(self) -> Self {
        self.map(|b| b.ignoring_all_expected_null_fields())
    }

    pub fn comparing_only_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.comparing_only_fields(fields))
    }

    pub fn using_overridden_equals(self) -> Self {
        self.map(|b| b.using_overridden_equals())
    }

    pub fn with_comparator_for_type<U, F>(self, compare: F) -> Self
    where
        U: Any,
        F: Fn(&U, &U) -> Ordering + Send + Sync + 'static,
    {
        self.map(|b| b.with_comparator_for_type::<U, F>(compare))
    }

    pub fn with_equals_for_type<U, F>(self, equals: F) -> Self
    where
        U: Any,
        F: Fn(&U, &U) -> bool + Send + Sync + 'static,
    {
        self.map(|b| b.with_equals_for_type::<U, F>(equals))
    }

    pub fn with_comparator_for_fields<I, S>(self, comparator: Comparator, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.with_comparator_for_fields(comparator, fields))
    }

    pub fn with_equals_for_fields<U, F, I, S>(self, equals: F, fields: I) -> Self
    where
        U: Any,
        F: Fn(&U, &U) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.with_equals_for_fields::<U, F, I, S>(equals, fields))
    }

    pub fn with_error_message_for_fields<I, S>(self, message: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.with_error_message_for_fields(message, fields))
    }

    pub fn with_collection_policy(self, policy: CollectionAssertionPolicy) -> Self {
        self.map(|b| b.with_collection_policy(policy))
    }

    pub fn with_map_policy(self, policy: MapAssertionPolicy) -> Self {
        self.map(|b| b.with_map_policy(policy))
    }

    pub fn with_optional_policy(self, policy: OptionalAssertionPolicy) -> Self {
        self.map(|b| b.with_optional_policy(policy))
    }

    pub fn ignoring_collection_order(self) -> Self {
        self.map(|b| b.ignoring_collection_order())
    }

    pub fn ignoring_collection_order_in_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|b| b.ignoring_collection_order_in_fields(fields))
    }

    pub fn treating_null_and_empty_iterables_as_equal(self) -> Self {
        self.map(|b| b.treating_null_and_empty_iterables_as_equal())
    }

    pub fn with_profile(self, profile: ComparisonProfile) -> Self {
        self.map(|b| b.with_profile(profile))
    }

    /// Compares and returns the differences without judging them.
    pub fn differences<E: Introspect + ?Sized>(
        self,
        expected: &E,
    ) -> Result<Vec<ComparisonDifference>, AssertionError> {
        let config = self.builder.build()?;
        Ok(RecursiveComparator::new(&config).compare(self.actual, expected)?)
    }

    pub fn try_is_equal_to<E: Introspect + ?Sized>(self, expected: &E) -> Result<(), AssertionError> {
        let config = self.builder.build()?;
        let snapshot = Snapshot::of_pair(self.actual, expected);
        let differences = RecursiveComparator::new(&config).compare_snapshot(&snapshot)?;
        if differences.is_empty() {
            return Ok(());
        }
        debug!(differences = differences.len(), "recursive comparison failed");
        let message = render_failure(
            &represent(snapshot.actual()),
            &represent(snapshot.expected()),
            &differences,
            &config,
        );
        Err(AssertionError::failed(self.description.as_deref(), message))
    }

    /// Panics with the rendered differences unless `actual` equals
    /// `expected` field by field.
    #[track_caller]
    pub fn is_equal_to<E: Introspect + ?Sized>(self, expected: &E) {
        if let Err(error) = self.try_is_equal_to(expected) {
            panic!("{error}");
        }
    }

    pub fn try_is_not_equal_to<E: Introspect + ?Sized>(self, expected: &E) -> Result<(), AssertionError> {
        let config = self.builder.build()?;
        let snapshot = Snapshot::of_pair(self.actual, expected);
        let differences = RecursiveComparator::new(&config).compare_snapshot(&snapshot)?;
        if !differences.is_empty() {
            return Ok(());
        }
        let message = format!(
            "Expecting actual:\n  {}\nnot to be equal to:\n  {}\n\
             when recursively comparing field by field\n\n\
             The recursive comparison was performed with this configuration:\n{config}",
            represent(snapshot.actual()),
            represent(snapshot.expected()),
        );
        Err(AssertionError::failed(self.description.as_deref(), message))
    }

    #[track_caller]
    pub fn is_not_equal_to<E: Introspect + ?Sized>(self, expected: &E) {
        if let Err(error) = self.try_is_not_equal_to(expected) {
            panic!("{error}");
        }
    }
}

/// Shorthand for a default recursive comparison.
pub fn recursively_equal<A, E>(actual: &A, expected: &E) -> Result<(), AssertionError>
where
    A: Introspect + ?Sized,
    E: Introspect + ?Sized,
{
    RecursiveComparisonAssert::new(actual, None, RecursiveComparisonConfiguration::builder()).try_is_equal_to(expected)
}
