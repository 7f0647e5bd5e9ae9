//! Entry point of the fluent surface.

use std::fmt;

use deepcheck_kernel::{
    Introspect, NodeId, NodeRef, PropertyAccessor, RecursiveAssertionConfiguration,
    RecursiveComparisonConfiguration, Snapshot, represent,
};

use crate::error::AssertionError;
use crate::recursive_assertion::RecursiveAssertionAssert;
use crate::recursive_comparison::RecursiveComparisonAssert;

/// Starts an assertion chain on `actual`.
pub fn assert_that<T: Introspect + ?Sized>(actual: &T) -> ObjectAssert<'_, T> {
    ObjectAssert {
        actual,
        description: None,
    }
}

pub struct ObjectAssert<'a, T: ?Sized> {
    actual: &'a T,
    description: Option<String>,
}

impl<'a, T: Introspect + ?Sized> ObjectAssert<'a, T> {
    /// Prefixes every failure message of this chain with `[description]`.
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn using_recursive_comparison(self) -> RecursiveComparisonAssert<'a, T> {
        RecursiveComparisonAssert::new(self.actual, self.description, RecursiveComparisonConfiguration::builder())
    }

    /// Starts from a prepared configuration; further options refine it.
    pub fn using_recursive_comparison_with(
        self,
        config: &RecursiveComparisonConfiguration,
    ) -> RecursiveComparisonAssert<'a, T> {
        RecursiveComparisonAssert::new(self.actual, self.description, config.to_builder())
    }

    pub fn using_recursive_assertion(self) -> RecursiveAssertionAssert<'a, T> {
        RecursiveAssertionAssert::new(self.actual, self.description, RecursiveAssertionConfiguration::builder())
    }

    pub fn using_recursive_assertion_with(
        self,
        config: &RecursiveAssertionConfiguration,
    ) -> RecursiveAssertionAssert<'a, T> {
        RecursiveAssertionAssert::new(self.actual, self.description, config.to_builder())
    }

    /// Resolves `a.b[0].c` on the actual value.
    pub fn extracting(&self, path: &str) -> Result<Extracted, AssertionError> {
        let snapshot = Snapshot::of(self.actual);
        let node = PropertyAccessor::default()
            .resolve(snapshot.root(), path)?
            .map(|node| node.id());
        Ok(Extracted {
            path: path.to_string(),
            snapshot,
            node,
            description: self.description.clone(),
        })
    }
}

/// A value reached through [`ObjectAssert::extracting`]. An absent value
/// (null, or a null met on the way) extracts as `None`.
pub struct Extracted {
    path: String,
    snapshot: Snapshot,
    node: Option<NodeId>,
    description: Option<String>,
}

impl Extracted {
    pub fn node(&self) -> Option<NodeRef<'_>> {
        self.node.map(|id| self.snapshot.graph().get(id))
    }

    pub fn is_present(&self) -> bool {
        self.node.is_some()
    }

    pub fn try_satisfies<P>(&self, predicate: P, predicate_description: &str) -> Result<(), AssertionError>
    where
        P: FnOnce(NodeRef<'_>) -> bool,
    {
        match self.node() {
            Some(node) if predicate(node) => Ok(()),
            Some(node) => Err(AssertionError::failed(
                self.description.as_deref(),
                format!(
                    "Expecting extracted `{}`:\n  {}\nto satisfy: {predicate_description}",
                    self.path,
                    represent(node)
                ),
            )),
            None => Err(AssertionError::failed(
                self.description.as_deref(),
                format!(
                    "Expecting extracted `{}` to satisfy: {predicate_description}\nbut it was absent",
                    self.path
                ),
            )),
        }
    }

    #[track_caller]
    pub fn satisfies<P>(&self, predicate: P, predicate_description: &str)
    where
        P: FnOnce(NodeRef<'_>) -> bool,
    {
        if let Err(error) = self.try_satisfies(predicate, predicate_description) {
            panic!("{error}");
        }
    }
}

impl fmt::Display for Extracted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Some(node) => f.write_str(&represent(node)),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Debug for Extracted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extracted")
            .field("path", &self.path)
            .field("value", &self.to_string())
            .finish()
    }
}
