//! Comparator registries.
//!
//! A [`Comparator`] decides equality of two nodes as a whole; the engine
//! never recurses into a node a comparator was applied to. Comparators are
//! registered per type ([`TypeComparators`]) or per field path
//! ([`FieldComparators`]); a field comparator wins over a type comparator.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::graph::{Node, NodeRef, TypeKey};

/// Default precision of `f64` comparisons.
pub const DEFAULT_F64_EPSILON: f64 = 1e-15;
/// Default precision of `f32` comparisons.
pub const DEFAULT_F32_EPSILON: f32 = 1e-6;

type CompareFn = dyn for<'g> Fn(NodeRef<'g>, NodeRef<'g>) -> Option<bool> + Send + Sync;

/// An equality decision over two nodes.
///
/// [`apply`](Self::apply) returns `None` when the comparator does not
/// understand the values it is given (for instance a typed comparator meeting
/// a node without a payload of its type).
#[derive(Clone)]
pub struct Comparator {
    description: String,
    compare: Arc<CompareFn>,
}

impl Comparator {
    /// Equality over the typed payloads of both nodes.
    pub fn equals<T, F>(description: impl Into<String>, equals: F) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            compare: Arc::new(move |actual: NodeRef<'_>, expected: NodeRef<'_>| {
                Some(equals(actual.downcast::<T>()?, expected.downcast::<T>()?))
            }),
        }
    }

    /// Equality derived from an ordering: values are equal when it yields
    /// [`Ordering::Equal`].
    pub fn ordering<T, F>(description: impl Into<String>, compare: F) -> Self
    where
        T: Any,
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::equals::<T, _>(description, move |a, b| compare(a, b) == Ordering::Equal)
    }

    /// Equality over the nodes themselves, for comparators that inspect
    /// structure rather than one payload type.
    pub fn nodes<F>(description: impl Into<String>, equals: F) -> Self
    where
        F: for<'g> Fn(NodeRef<'g>, NodeRef<'g>) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            compare: Arc::new(move |actual: NodeRef<'_>, expected: NodeRef<'_>| {
                Some(equals(actual, expected))
            }),
        }
    }

    /// `f64` values within `epsilon` of each other; NaN equals NaN.
    pub fn f64_within(epsilon: f64) -> Self {
        Self::equals::<f64, _>(format!("f64 within {epsilon:e}"), move |a, b| {
            a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= epsilon
        })
    }

    /// `f32` values within `epsilon` of each other; NaN equals NaN.
    pub fn f32_within(epsilon: f32) -> Self {
        Self::equals::<f32, _>(format!("f32 within {epsilon:e}"), move |a, b| {
            a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= epsilon
        })
    }

    pub fn apply(&self, actual: NodeRef<'_>, expected: NodeRef<'_>) -> Option<bool> {
        (self.compare)(actual, expected)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Comparators keyed by type. One comparator per type key; registering a
/// key again replaces the previous comparator.
#[derive(Debug, Clone, Default)]
pub struct TypeComparators {
    by_type: BTreeMap<TypeKey, Comparator>,
}

impl TypeComparators {
    /// Registry holding the floating point precision comparators.
    pub fn defaults() -> Self {
        let mut registry = Self::default();
        registry.register(TypeKey::of::<f64>(), Comparator::f64_within(DEFAULT_F64_EPSILON));
        registry.register(TypeKey::of::<f32>(), Comparator::f32_within(DEFAULT_F32_EPSILON));
        registry
    }

    pub fn register(&mut self, type_key: TypeKey, comparator: Comparator) {
        self.by_type.insert(type_key, comparator);
    }

    pub fn comparator_for_type(&self, type_key: TypeKey) -> Option<&Comparator> {
        self.by_type.get(&type_key)
    }

    /// First comparator along the node's exact type and declared lineage.
    pub fn comparator_for(&self, node: &Node) -> Option<&Comparator> {
        node.type_chain()
            .find_map(|type_key| self.by_type.get(&type_key))
    }

    pub fn has_comparator_for(&self, type_key: TypeKey) -> bool {
        self.by_type.contains_key(&type_key)
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &Comparator)> {
        self.by_type.iter()
    }
}

/// Comparators keyed by field rule path (`address.zip`), or by a regex over
/// rule paths. Exact paths win over regexes; regexes are tried in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct FieldComparators {
    by_path: BTreeMap<String, Comparator>,
    by_pattern: Vec<(Regex, Comparator)>,
}

impl FieldComparators {
    pub fn register(&mut self, rule_path: impl Into<String>, comparator: Comparator) {
        self.by_path.insert(rule_path.into(), comparator);
    }

    /// `pattern` must already be anchored.
    pub fn register_pattern(&mut self, pattern: Regex, comparator: Comparator) {
        self.by_pattern.push((pattern, comparator));
    }

    pub fn comparator_for(&self, rule_path: &str) -> Option<&Comparator> {
        self.by_path.get(rule_path).or_else(|| {
            self.by_pattern
                .iter()
                .find(|(pattern, _)| pattern.is_match(rule_path))
                .map(|(_, comparator)| comparator)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty() && self.by_pattern.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Comparator)> {
        self.by_path
            .iter()
            .map(|(path, comparator)| (path.as_str(), comparator))
            .chain(
                self.by_pattern
                    .iter()
                    .map(|(pattern, comparator)| (pattern.as_str(), comparator)),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{GraphBuilder, Introspect, Snapshot};
    use crate::graph::NodeId;

    trait Shape {}

    struct Square(f64);

    impl Introspect for Square {
        fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
            graph
                .bean::<Self>()
                .supertype::<dyn Shape>()
                .field("side", &self.0)
                .finish()
        }
    }

    #[test]
    fn default_float_precision() {
        let registry = TypeComparators::defaults();
        let snapshot = Snapshot::of_pair(&1.0f64, &(1.0f64 + 1e-16));
        let comparator = registry
            .comparator_for(snapshot.actual().node())
            .expect("f64 comparator");
        assert_eq!(comparator.apply(snapshot.actual(), snapshot.expected()), Some(true));

        let snapshot = Snapshot::of_pair(&f32::NAN, &f32::NAN);
        let comparator = registry.comparator_for(snapshot.actual().node()).unwrap();
        assert_eq!(comparator.apply(snapshot.actual(), snapshot.expected()), Some(true));
    }

    #[test]
    fn lineage_is_consulted_after_exact_type() {
        let mut registry = TypeComparators::default();
        registry.register(
            TypeKey::of::<dyn Shape>(),
            Comparator::nodes("any shape", |_, _| true),
        );
        let snapshot = Snapshot::of(&Square(2.0));
        let found = registry.comparator_for(snapshot.root().node()).unwrap();
        assert_eq!(found.description(), "any shape");

        registry.register(
            TypeKey::of::<Square>(),
            Comparator::nodes("squares", |_, _| false),
        );
        let found = registry.comparator_for(snapshot.root().node()).unwrap();
        assert_eq!(found.description(), "squares");
    }

    #[test]
    fn registering_twice_overwrites() {
        let mut registry = TypeComparators::defaults();
        registry.register(TypeKey::of::<f64>(), Comparator::f64_within(0.5));
        assert_eq!(
            registry
                .comparator_for_type(TypeKey::of::<f64>())
                .unwrap()
                .description(),
            "f64 within 5e-1"
        );
    }

    #[test]
    fn typed_comparator_rejects_foreign_payloads() {
        let comparator = Comparator::equals::<i32, _>("ints", |a, b| a == b);
        let snapshot = Snapshot::of_pair(&1i32, &"one");
        assert_eq!(comparator.apply(snapshot.actual(), snapshot.expected()), None);
    }

    #[test]
    fn exact_field_path_wins_over_pattern() {
        let mut fields = FieldComparators::default();
        fields.register_pattern(
            Regex::new("^(?:.*zip)$").unwrap(),
            Comparator::nodes("pattern", |_, _| true),
        );
        fields.register("address.zip", Comparator::nodes("exact", |_, _| true));
        assert_eq!(fields.comparator_for("address.zip").unwrap().description(), "exact");
        assert_eq!(fields.comparator_for("home.zip").unwrap().description(), "pattern");
        assert!(fields.comparator_for("home.city").is_none());
    }
}
