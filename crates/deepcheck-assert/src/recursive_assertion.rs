//! `assert_that(&actual).using_recursive_assertion()`.

use deepcheck_kernel::report::render_predicate_failures;
use deepcheck_kernel::{
    CollectionAssertionPolicy, IntrospectionStrategy, Introspect, MapAssertionPolicy, NodeRef,
    OptionalAssertionPolicy, RecursiveAssertionConfigurationBuilder, RecursiveAssertionDriver, Snapshot, TypeKey,
    represent,
};
use tracing::debug;

use crate::error::AssertionError;

pub struct RecursiveAssertionAssert<'a, T: ?Sized> {
    actual: &'a T,
    description: Option<String>,
    builder: RecursiveAssertionConfigurationBuilder,
}

impl<'a, T: Introspect + ?Sized> RecursiveAssertionAssert<'a, T> {
    pub(crate) fn new(
        actual: &'a T,
        description: Option<String>,
        builder: RecursiveAssertionConfigurationBuilder,
    ) -> Self {
        Self {
            actual,
            description,
            builder,
        }
    }

    fn map(
        mut self,
        f: impl FnOnce(RecursiveAssertionConfigurationBuilder) -> RecursiveAssertionConfigurationBuilder,
    ) -> Self {
        self.builder = f(self.builder);
        self
    }

    pub fn ignoring_all_null_fields(self) -> Self {
        self.map(|b| b.ignoring_all_null_fields())
    }

    pub fn ignoring_all_empty_optional_fields(self) -> Self {
        self.map(|b| b.ignoring_all_empty_optional_fields())
    }

    pub fn ignoring_primitive_fields(self) -> Self {
        self.map(|b| b.ignoring_primitive_fields())
    }

    /// Also descend into the members of `std`/`core`/`alloc` structs.
    pub fn recursing_into_library_types(self) -> Self {
        self.map(|b| b.skipping_library_types(false))
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

    pub fn with_collection_policy(self, policy: CollectionAssertionPolicy) -> Self {
        self.map(|b| b.with_collection_policy(policy))
    }

    pub fn with_map_policy(self, policy: MapAssertionPolicy) -> Self {
        self.map(|b| b.with_map_policy(policy))
    }

    pub fn with_optional_policy(self, policy: OptionalAssertionPolicy) -> Self {
        self.map(|b| b.with_optional_policy(policy))
    }

    pub fn with_introspection_strategy(self, strategy: IntrospectionStrategy) -> Self {
        self.map(|b| b.with_introspection_strategy(strategy))
    }

    pub fn try_all_fields_satisfy<P>(self, predicate: P) -> Result<(), AssertionError>
    where
        P: Fn(NodeRef<'_>) -> bool,
    {
        self.check(predicate, "the given predicate")
    }

    /// Panics listing every field, at any depth, that `predicate` rejects.
    #[track_caller]
    pub fn all_fields_satisfy<P>(self, predicate: P)
    where
        P: Fn(NodeRef<'_>) -> bool,
    {
        if let Err(error) = self.try_all_fields_satisfy(predicate) {
            panic!("{error}");
        }
    }

    pub fn try_has_no_null_fields(self) -> Result<(), AssertionError> {
        self.check(|node| !node.is_absent(), "is not null")
    }

    /// Panics if any field at any depth is null or an empty `Option`.
    #[track_caller]
    pub fn has_no_null_fields(self) {
        if let Err(error) = self.try_has_no_null_fields() {
            panic!("{error}");
        }
    }

    fn check<P>(self, predicate: P, predicate_description: &str) -> Result<(), AssertionError>
    where
        P: Fn(NodeRef<'_>) -> bool,
    {
        let config = self.builder.build()?;
        let snapshot = Snapshot::of(self.actual);
        let failures =
            RecursiveAssertionDriver::new(&config).assert_over(snapshot.root(), predicate, predicate_description);
        if failures.is_empty() {
            return Ok(());
        }
        debug!(failures = failures.len(), "recursive assertion failed");
        let message = render_predicate_failures(&represent(snapshot.root()), &failures, &config);
        Err(AssertionError::failed(self.description.as_deref(), message))
    }
}
