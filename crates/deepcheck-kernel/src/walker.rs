//! Recursive assertion over a single object graph.
//!
//! The walker visits every node reachable from the root and applies one
//! predicate to each node it does not ignore. Which nodes are tested and
//! which are descended into follows the
//! [`RecursiveAssertionConfiguration`]; the root itself is only a starting
//! point and is never tested.
//!
//! Traversal is depth first in declaration order with an explicit stack. A
//! node already on the active path is skipped, so cycles terminate while a
//! value shared by two siblings is still visited under both paths.

use tracing::debug;

use crate::accessor::{OPTIONAL_VALUE, PropertyAccessor};
use crate::assertion_config::RecursiveAssertionConfiguration;
use crate::cycle::CycleTracker;
use crate::difference::PredicateFailure;
use crate::graph::{NodeId, NodeKind, NodeRef};
use crate::introspect::{Introspect, Snapshot};
use crate::path::FieldPath;
use crate::repr::Representation;

enum Task<'g> {
    Visit(FieldPath, NodeRef<'g>),
    Leave(NodeId),
}

/// Applies a predicate to every node of a graph.
#[derive(Debug, Clone, Copy)]
pub struct RecursiveAssertionDriver<'c> {
    config: &'c RecursiveAssertionConfiguration,
}

impl<'c> RecursiveAssertionDriver<'c> {
    pub fn new(config: &'c RecursiveAssertionConfiguration) -> Self {
        Self { config }
    }

    /// Snapshots `value` and asserts over it.
    pub fn assert_over_value<T, P>(&self, value: &T, predicate: P, description: &str) -> Vec<PredicateFailure>
    where
        T: Introspect + ?Sized,
        P: Fn(NodeRef<'_>) -> bool,
    {
        let snapshot = Snapshot::of(value);
        self.assert_over(snapshot.root(), predicate, description)
    }

    /// Returns one failure per rejected node, in discovery order.
    pub fn assert_over<P>(&self, root: NodeRef<'_>, predicate: P, description: &str) -> Vec<PredicateFailure>
    where
        P: Fn(NodeRef<'_>) -> bool,
    {
        debug!(
            root = %root.type_key().short_name(),
            nodes = root.graph().len(),
            predicate = description,
            "starting recursive assertion"
        );
        let accessor = PropertyAccessor::new(self.config.introspection_strategy());
        let repr = Representation::default();
        let mut tracker = CycleTracker::new();
        let mut failures = Vec::new();
        let mut visited = 0usize;
        let mut stack = vec![Task::Visit(FieldPath::root(), root)];

        while let Some(task) = stack.pop() {
            let (path, node) = match task {
                Task::Leave(id) => {
                    tracker.leave(id);
                    continue;
                }
                Task::Visit(path, node) => (path, node),
            };
            if self.config.should_ignore(&path, node) {
                continue;
            }
            if node.node().may_cycle() {
                if !tracker.enter(node.id()) {
                    continue;
                }
                stack.push(Task::Leave(node.id()));
            }
            visited += 1;
            if !path.is_root() && self.is_tested(node) && !predicate(node) {
                failures.push(PredicateFailure {
                    path: path.clone(),
                    value: repr.render(node),
                    predicate: description.to_string(),
                });
            }
            let children = self.children(&accessor, &path, node);
            stack.extend(children.into_iter().rev().map(|(path, child)| Task::Visit(path, child)));
        }

        debug!(
            visited,
            failures = failures.len(),
            "recursive assertion finished"
        );
        failures
    }

    fn is_tested(&self, node: NodeRef<'_>) -> bool {
        match node.kind() {
            NodeKind::Sequence { .. } => self.config.collection_policy().visits_object(),
            NodeKind::Map { .. } => self.config.map_policy().visits_object(),
            // An empty optional stands in for its missing value.
            NodeKind::Optional(None) => true,
            NodeKind::Optional(Some(_)) => self.config.optional_policy().visits_object(),
            _ => true,
        }
    }

    fn children<'g>(
        &self,
        accessor: &PropertyAccessor,
        path: &FieldPath,
        node: NodeRef<'g>,
    ) -> Vec<(FieldPath, NodeRef<'g>)> {
        match node.kind() {
            NodeKind::Sequence { items, .. } if self.config.collection_policy().visits_elements() => items
                .iter()
                .enumerate()
                .map(|(index, id)| (path.index(index), node.child(*id)))
                .collect(),
            NodeKind::Map { entries, .. } if self.config.map_policy().visits_values() => entries
                .iter()
                .map(|entry| (path.key(&entry.key), node.child(entry.value)))
                .collect(),
            NodeKind::Optional(Some(id)) if self.config.optional_policy().visits_value() => {
                vec![(path.field(OPTIONAL_VALUE), node.child(*id))]
            }
            NodeKind::Bean { .. } if self.config.recurses_into(node) => accessor
                .members(node)
                .into_iter()
                .map(|member| (path.field(&member.name), node.child(member.node)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::graph::NodeId;
    use crate::introspect::GraphBuilder;
    use crate::policy::{CollectionAssertionPolicy, MapAssertionPolicy, OptionalAssertionPolicy};

    fn paths(failures: &[PredicateFailure]) -> Vec<String> {
        failures.iter().map(|f| f.path.render()).collect()
    }

    fn not_null(node: NodeRef<'_>) -> bool {
        !node.is_absent()
    }

    #[test]
    fn reports_the_single_nested_null() {
        let value = json!({"a": {"b": {"c": null, "d": 1}}, "e": "x"});
        let config = RecursiveAssertionConfiguration::default();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(&value, not_null, "is not null");
        assert_eq!(paths(&failures), vec!["a.b.c"]);
        assert_eq!(failures[0].value, "null");
        assert_eq!(failures[0].predicate, "is not null");
    }

    #[test]
    fn root_is_never_tested() {
        let config = RecursiveAssertionConfiguration::default();
        let failures =
            RecursiveAssertionDriver::new(&config).assert_over_value(&json!(null), not_null, "is not null");
        assert!(failures.is_empty());
    }

    #[test]
    fn collection_policy_decides_what_is_tested() {
        let value = json!({"items": [1, 2]});
        let always_fail = |_: NodeRef<'_>| false;

        let elements_only = RecursiveAssertionConfiguration::default();
        let failures = RecursiveAssertionDriver::new(&elements_only).assert_over_value(&value, always_fail, "never");
        assert_eq!(paths(&failures), vec!["items[0]", "items[1]"]);

        let object_only = RecursiveAssertionConfiguration::builder()
            .with_collection_policy(CollectionAssertionPolicy::CollectionObjectOnly)
            .build()
            .unwrap();
        let failures = RecursiveAssertionDriver::new(&object_only).assert_over_value(&value, always_fail, "never");
        assert_eq!(paths(&failures), vec!["items"]);

        let both = RecursiveAssertionConfiguration::builder()
            .with_collection_policy(CollectionAssertionPolicy::CollectionObjectAndElements)
            .with_map_policy(MapAssertionPolicy::MapObjectAndEntries)
            .build()
            .unwrap();
        let failures = RecursiveAssertionDriver::new(&both).assert_over_value(&value, always_fail, "never");
        assert_eq!(paths(&failures), vec!["items", "items[0]", "items[1]"]);
    }

    #[test]
    fn optional_contents_are_visited_under_value() {
        let value: (Option<i32>, Option<i32>) = (Some(3), None);
        let config = RecursiveAssertionConfiguration::builder()
            .with_optional_policy(OptionalAssertionPolicy::OptionalObjectAndValue)
            .build()
            .unwrap();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(
            &value,
            |node| !node.is_empty_optional() && node.as_f64() != Some(3.0),
            "is present and not three",
        );
        assert_eq!(paths(&failures), vec!["0.value", "1"]);
    }

    #[test]
    fn empty_optionals_are_tested_under_the_default_policy() {
        let value: (Option<i32>, Option<i32>, Option<Option<i32>>) = (Some(3), None, Some(None));
        let config = RecursiveAssertionConfiguration::default();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(&value, not_null, "is not null");
        assert_eq!(paths(&failures), vec!["1", "2.value"]);

        let config = RecursiveAssertionConfiguration::builder()
            .ignoring_all_null_fields()
            .build()
            .unwrap();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(&value, not_null, "is not null");
        assert!(failures.is_empty());
    }

    #[test]
    fn ignored_fields_and_nulls_are_skipped() {
        let value = json!({"a": null, "b": {"c": null}, "d": null});
        let config = RecursiveAssertionConfiguration::builder()
            .ignoring_fields(["b"])
            .build()
            .unwrap();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(&value, not_null, "is not null");
        assert_eq!(paths(&failures), vec!["a", "d"]);

        let config = RecursiveAssertionConfiguration::builder()
            .ignoring_all_null_fields()
            .build()
            .unwrap();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(&value, not_null, "is not null");
        assert!(failures.is_empty());
    }

    struct Link {
        label: String,
        next: RefCell<Option<Rc<Link>>>,
    }

    impl Introspect for Link {
        fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
            graph
                .bean::<Self>()
                .field("label", &self.label)
                .field("next", &self.next)
                .finish()
        }
    }

    #[test]
    fn cycles_terminate() {
        let link = Rc::new(Link {
            label: "loop".into(),
            next: RefCell::new(None),
        });
        *link.next.borrow_mut() = Some(Rc::clone(&link));
        let config = RecursiveAssertionConfiguration::default();
        let failures = RecursiveAssertionDriver::new(&config).assert_over_value(
            &link,
            |node| node.as_str() != Some("loop"),
            "is not loop",
        );
        assert_eq!(paths(&failures), vec!["label"]);
        link.next.borrow_mut().take();
    }
}
