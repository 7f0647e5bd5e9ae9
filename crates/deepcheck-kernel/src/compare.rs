//! The recursive comparison engine.
//!
//! Two values are snapshotted into one [`ObjectGraph`] and walked in lock
//! step with an explicit work stack, so deep graphs never exhaust the call
//! stack. Each [`DualValue`] goes through the same steps:
//!
//! ```text
//! filter (compared / ignored fields)      root exempt
//!   → identity                            same node: equal
//!   → nulls                               one side null: value mismatch
//!   → cycle                               pair already active: cut
//!   → comparator (field, then type)       leaf cut
//!   → strict type check                   type mismatch
//!   → category dispatch                   Scalar | Library | Sequence | Map | Optional | Bean
//! ```
//!
//! Every difference found is collected; the walk never stops at the first.

use tracing::{debug, warn};

use crate::accessor::PropertyAccessor;
use crate::assignment::minimal_assignment;
use crate::config::RecursiveComparisonConfiguration;
use crate::cycle::{CycleTracker, PairKey};
use crate::difference::{ComparisonDifference, DifferenceKind};
use crate::error::ComparisonError;
use crate::graph::{MapEntry, NodeId, NodeKind, NodeRef, ObjectGraph};
use crate::introspect::{Introspect, Snapshot};
use crate::path::FieldPath;
use crate::repr::Representation;

/// One pair of nodes under comparison and the path leading to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualValue {
    pub path: FieldPath,
    pub actual: NodeId,
    pub expected: NodeId,
}

impl DualValue {
    fn key(&self) -> PairKey {
        (self.actual, self.expected)
    }
}

/// The structural category that decides how a pair is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Scalar,
    /// Types in excluded namespaces, and beans compared with their own
    /// `PartialEq`.
    Library,
    Sequence,
    Map,
    Optional,
    Bean,
}

enum Task {
    Compare(DualValue),
    Leave(PairKey),
    Report(Box<ComparisonDifference>),
}

/// Compares object graphs under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct RecursiveComparator<'c> {
    config: &'c RecursiveComparisonConfiguration,
}

impl<'c> RecursiveComparator<'c> {
    pub fn new(config: &'c RecursiveComparisonConfiguration) -> Self {
        Self { config }
    }

    pub fn compare<A, E>(&self, actual: &A, expected: &E) -> Result<Vec<ComparisonDifference>, ComparisonError>
    where
        A: Introspect + ?Sized,
        E: Introspect + ?Sized,
    {
        self.compare_snapshot(&Snapshot::of_pair(actual, expected))
    }

    pub fn compare_snapshot(&self, snapshot: &Snapshot) -> Result<Vec<ComparisonDifference>, ComparisonError> {
        let accessor = PropertyAccessor::new(self.config.introspection_strategy());
        for field in self.config.compared_fields() {
            validate_compared_field(&accessor, snapshot.actual(), field)?;
        }
        debug!(
            actual = %snapshot.actual().type_key().short_name(),
            expected = %snapshot.expected().type_key().short_name(),
            nodes = snapshot.graph().len(),
            "starting recursive comparison"
        );
        let mut walk = Walk {
            graph: snapshot.graph(),
            config: self.config,
            accessor,
            repr: Representation::default(),
            tracker: CycleTracker::new(),
            differences: Vec::new(),
        };
        walk.run(DualValue {
            path: FieldPath::root(),
            actual: snapshot.actual().id(),
            expected: snapshot.expected().id(),
        });
        debug!(
            differences = walk.differences.len(),
            "recursive comparison finished"
        );
        Ok(walk.differences)
    }
}

/// Compares `actual` to `expected` under `config`.
pub fn determine_differences<A, E>(
    actual: &A,
    expected: &E,
    config: &RecursiveComparisonConfiguration,
) -> Result<Vec<ComparisonDifference>, ComparisonError>
where
    A: Introspect + ?Sized,
    E: Introspect + ?Sized,
{
    RecursiveComparator::new(config).compare(actual, expected)
}

/// Checks that a compared field names members that exist on the actual
/// value. Sequences are looked through; maps and absent values accept any
/// name below them.
fn validate_compared_field(
    accessor: &PropertyAccessor,
    root: NodeRef<'_>,
    field: &str,
) -> Result<(), ComparisonError> {
    let mut frontier = vec![root];
    for name in field.split('.') {
        let mut next = Vec::new();
        while let Some(node) = frontier.pop() {
            match node.kind() {
                NodeKind::Null | NodeKind::Optional(None) | NodeKind::Map { .. } => {}
                NodeKind::Sequence { items, .. } => {
                    frontier.extend(items.iter().map(|id| node.child(*id)));
                }
                _ => {
                    let child = accessor.get(node, name).map_err(|source| {
                        ComparisonError::ComparedFieldNotFound {
                            field: field.to_string(),
                            source,
                        }
                    })?;
                    next.extend(child);
                }
            }
        }
        frontier = next;
    }
    Ok(())
}

fn category_name(node: NodeRef<'_>) -> &'static str {
    match node.kind() {
        NodeKind::Null => "null",
        NodeKind::Leaf | NodeKind::Pending => "a value",
        NodeKind::Sequence { kind, .. } if kind.is_ordered() => "an ordered collection",
        NodeKind::Sequence { .. } => "an unordered collection",
        NodeKind::Map { .. } => "a map",
        NodeKind::Optional(_) => "an optional",
        NodeKind::Bean {
            variant: Some(_), ..
        } => "an enum value",
        NodeKind::Bean { .. } => "a bean",
    }
}

/// An empty sequence or map, possibly wrapped in present optionals.
fn is_empty_iterable(node: NodeRef<'_>) -> bool {
    let mut node = node;
    loop {
        match node.kind() {
            NodeKind::Sequence { .. } | NodeKind::Map { .. } => return node.len() == Some(0),
            NodeKind::Optional(Some(content)) => node = node.child(*content),
            _ => return false,
        }
    }
}

struct Walk<'g, 'c> {
    graph: &'g ObjectGraph,
    config: &'c RecursiveComparisonConfiguration,
    accessor: PropertyAccessor,
    repr: Representation,
    tracker: CycleTracker<PairKey>,
    differences: Vec<ComparisonDifference>,
}

impl<'g> Walk<'g, '_> {
    fn run(&mut self, root: DualValue) {
        let mut stack = vec![Task::Compare(root)];
        self.drain(&mut stack);
    }

    fn drain(&mut self, stack: &mut Vec<Task>) {
        while let Some(task) = stack.pop() {
            match task {
                Task::Compare(dual) => self.step(dual, stack),
                Task::Leave(key) => self.tracker.leave(key),
                Task::Report(difference) => self.differences.push(*difference),
            }
        }
    }

    /// Runs the scheduled work in isolation and returns what it found,
    /// leaving the outer difference list untouched. The cycle tracker is
    /// shared, so nested work still sees the active path.
    fn differences_of(&mut self, schedule: impl FnOnce(&mut Self, &mut Vec<Task>)) -> Vec<ComparisonDifference> {
        let saved = std::mem::take(&mut self.differences);
        let mut stack = Vec::new();
        schedule(self, &mut stack);
        self.drain(&mut stack);
        std::mem::replace(&mut self.differences, saved)
    }

    fn node(&self, id: NodeId) -> NodeRef<'g> {
        self.graph.get(id)
    }

    fn render(&self, node: NodeRef<'_>) -> String {
        self.repr.render(node)
    }

    fn difference(
        &self,
        path: FieldPath,
        kind: DifferenceKind,
        actual: Option<NodeRef<'g>>,
        expected: Option<NodeRef<'g>>,
        description: Option<String>,
    ) -> ComparisonDifference {
        let rule_path = path.rule_path();
        let custom_message = actual
            .and_then(|node| self.config.message_for(&rule_path, node.node()))
            .or_else(|| expected.and_then(|node| self.config.message_for(&rule_path, node.node())));
        let mut difference = ComparisonDifference::new(
            path,
            kind,
            actual.map(|node| self.render(node)),
            expected.map(|node| self.render(node)),
        )
        .with_custom_message(custom_message);
        difference.description = description;
        difference
    }

    fn report(
        &mut self,
        dual: &DualValue,
        kind: DifferenceKind,
        description: Option<String>,
    ) {
        let difference = self.difference(
            dual.path.clone(),
            kind,
            Some(self.node(dual.actual)),
            Some(self.node(dual.expected)),
            description,
        );
        self.differences.push(difference);
    }

    fn value_mismatch(&mut self, dual: &DualValue, description: Option<String>) {
        self.report(dual, DifferenceKind::ValueMismatch, description);
    }

    fn category_mismatch(&mut self, dual: &DualValue, expected: NodeRef<'g>, actual: NodeRef<'g>) {
        let description = format!(
            "expected field is {} but actual field is not ({})",
            category_name(expected),
            actual.type_key().short_name()
        );
        self.value_mismatch(dual, Some(description));
    }

    /// Whether a member or entry present on one side only is reported.
    fn reportable(&self, path: &FieldPath) -> bool {
        let rule_path = path.rule_path();
        self.config.is_compared(&rule_path) && !self.config.is_ignored_field(&rule_path)
    }

    fn category(&self, node: NodeRef<'g>, rule_path: &str) -> Category {
        match node.kind() {
            NodeKind::Null | NodeKind::Leaf | NodeKind::Pending => Category::Scalar,
            NodeKind::Sequence { .. } => Category::Sequence,
            NodeKind::Map { .. } => Category::Map,
            NodeKind::Optional(_) => Category::Optional,
            NodeKind::Bean { .. } => {
                let by_equals = node.payload().is_some()
                    && (self.config.compares_by_equals(node.type_key())
                        || self.config.uses_overridden_equals(rule_path, node.node()));
                if by_equals {
                    Category::Library
                } else {
                    Category::Bean
                }
            }
        }
    }

    fn step(&mut self, dual: DualValue, stack: &mut Vec<Task>) {
        let actual = self.node(dual.actual);
        let expected = self.node(dual.expected);
        let rule_path = dual.path.rule_path();
        let config = self.config;

        if !dual.path.is_root()
            && (!config.is_compared(&rule_path)
                || config.should_ignore(&dual.path, actual, expected))
        {
            return;
        }

        if dual.actual == dual.expected {
            return;
        }

        match (actual.is_null(), expected.is_null()) {
            (true, true) => return,
            (true, false) | (false, true) => {
                let other = if actual.is_null() { expected } else { actual };
                let empty = other.is_empty_optional() || is_empty_iterable(other);
                if !(config.treats_null_and_empty_iterables_as_equal() && empty) {
                    self.value_mismatch(&dual, None);
                }
                return;
            }
            (false, false) => {}
        }

        if actual.node().may_cycle() || expected.node().may_cycle() {
            if !self.tracker.enter(dual.key()) {
                return;
            }
            stack.push(Task::Leave(dual.key()));
        }

        if let Some(comparator) = config.comparator_for(&rule_path, actual.node(), expected.node()) {
            match comparator.apply(actual, expected) {
                Some(true) => return,
                Some(false) => {
                    let description = format!("when comparing values using {comparator}");
                    self.value_mismatch(&dual, Some(description));
                    return;
                }
                None if actual.type_key() == expected.type_key() => warn!(
                    path = %dual.path,
                    comparator = comparator.description(),
                    "registered comparator could not be applied, comparing structurally"
                ),
                None => debug!(
                    path = %dual.path,
                    comparator = comparator.description(),
                    "comparator does not apply to values of different types"
                ),
            }
        }

        if config.strict_type_checking() && actual.type_key() != expected.type_key() {
            let description = format!(
                "the comparison enforces strict type checking and actual type {} differs from expected type {}",
                actual.type_key().short_name(),
                expected.type_key().short_name()
            );
            self.report(&dual, DifferenceKind::TypeMismatch, Some(description));
            return;
        }

        match self.category(expected, &rule_path) {
            Category::Scalar => self.compare_scalars(&dual, actual, expected),
            Category::Library => self.compare_by_equals(&dual, actual, expected),
            Category::Sequence => self.compare_sequences(&dual, actual, expected, stack),
            Category::Map => self.compare_maps(&dual, actual, expected, stack),
            Category::Optional => self.compare_optionals(&dual, actual, expected, stack),
            Category::Bean => self.compare_beans(&dual, actual, expected, stack),
        }
    }

    /// A unit enum variant against a string leaf holding its name.
    fn enum_matches_string(&self, actual: NodeRef<'g>, expected: NodeRef<'g>) -> Option<bool> {
        if !self.config.allows_enum_against_string() {
            return None;
        }
        let variant_and_text = |variant: NodeRef<'g>, text: NodeRef<'g>| match variant.kind() {
            NodeKind::Bean {
                variant: Some(name),
                members,
            } if members.is_empty() => text.as_str().map(|text| text == *name),
            _ => None,
        };
        variant_and_text(actual, expected).or_else(|| variant_and_text(expected, actual))
    }

    fn payloads_equal(actual: NodeRef<'g>, expected: NodeRef<'g>) -> bool {
        match (actual.payload(), expected.payload()) {
            (Some(actual), Some(expected)) => actual.eq_dyn(expected),
            _ => false,
        }
    }

    fn compare_scalars(&mut self, dual: &DualValue, actual: NodeRef<'g>, expected: NodeRef<'g>) {
        if let Some(equal) = self.enum_matches_string(actual, expected) {
            if !equal {
                self.value_mismatch(dual, None);
            }
            return;
        }
        match actual.kind() {
            NodeKind::Leaf => {
                if !Self::payloads_equal(actual, expected) {
                    self.value_mismatch(dual, None);
                }
            }
            _ => self.category_mismatch(dual, expected, actual),
        }
    }

    fn compare_by_equals(&mut self, dual: &DualValue, actual: NodeRef<'g>, expected: NodeRef<'g>) {
        if !Self::payloads_equal(actual, expected) {
            self.value_mismatch(dual, None);
        }
    }

    fn compare_sequences(
        &mut self,
        dual: &DualValue,
        actual: NodeRef<'g>,
        expected: NodeRef<'g>,
        stack: &mut Vec<Task>,
    ) {
        let NodeKind::Sequence {
            kind: expected_kind,
            items: expected_items,
        } = expected.kind()
        else {
            return;
        };
        let NodeKind::Sequence {
            kind: actual_kind,
            items: actual_items,
        } = actual.kind()
        else {
            self.category_mismatch(dual, expected, actual);
            return;
        };
        let unordered =
            !expected_kind.is_ordered() || self.config.ignores_collection_order(&dual.path.rule_path());
        if !unordered && !actual_kind.is_ordered() {
            self.category_mismatch(dual, expected, actual);
            return;
        }

        let policy = self.config.collection_policy();
        if !policy.visits_elements() {
            let nested = self.differences_of(|walk, stack| {
                walk.schedule_elements(dual, actual_items, expected_items, unordered, stack)
            });
            if !nested.is_empty() {
                let description = format!("collections differ in {} element(s)", nested.len());
                self.value_mismatch(dual, Some(description));
            }
            return;
        }
        if policy.visits_object() && actual_items.len() != expected_items.len() {
            let description = format!(
                "actual size {} differs from expected size {}",
                actual_items.len(),
                expected_items.len()
            );
            self.report(dual, DifferenceKind::SizeMismatch, Some(description));
        }
        self.schedule_elements(dual, actual_items, expected_items, unordered, stack);
    }

    fn schedule_elements(
        &mut self,
        dual: &DualValue,
        actual_items: &'g [NodeId],
        expected_items: &'g [NodeId],
        unordered: bool,
        stack: &mut Vec<Task>,
    ) {
        if unordered {
            self.compare_unordered(dual, actual_items, expected_items);
            return;
        }
        let len = actual_items.len().max(expected_items.len());
        let mut tasks = Vec::with_capacity(len);
        for index in 0..len {
            let path = dual.path.index(index);
            let task = match (actual_items.get(index), expected_items.get(index)) {
                (Some(actual), Some(expected)) => Task::Compare(DualValue {
                    path,
                    actual: *actual,
                    expected: *expected,
                }),
                (Some(actual), None) => Task::Report(Box::new(self.difference(
                    path,
                    DifferenceKind::MissingField,
                    Some(self.node(*actual)),
                    None,
                    None,
                ))),
                (None, Some(expected)) => Task::Report(Box::new(self.difference(
                    path,
                    DifferenceKind::ExtraField,
                    None,
                    Some(self.node(*expected)),
                    None,
                ))),
                (None, None) => continue,
            };
            tasks.push(task);
        }
        stack.extend(tasks.into_iter().rev());
    }

    /// Pairs elements so the total number of differences is minimal, then
    /// reports every element left without an equal partner in one
    /// difference at the collection path.
    fn compare_unordered(&mut self, dual: &DualValue, actual_items: &'g [NodeId], expected_items: &'g [NodeId]) {
        let mut cost = Vec::with_capacity(actual_items.len());
        for (index, actual) in actual_items.iter().enumerate() {
            let mut row = Vec::with_capacity(expected_items.len());
            for expected in expected_items {
                let pair = DualValue {
                    path: dual.path.index(index),
                    actual: *actual,
                    expected: *expected,
                };
                row.push(self.differences_of(|_, stack| stack.push(Task::Compare(pair))).len());
            }
            cost.push(row);
        }
        let pairing = minimal_assignment(&cost);

        let mut matched_expected = vec![false; expected_items.len()];
        let mut unmatched_actual = Vec::new();
        let mut closest = Vec::new();
        for (row, column) in pairing.iter().enumerate() {
            match column {
                Some(column) if cost[row][*column] == 0 => matched_expected[*column] = true,
                Some(column) => {
                    unmatched_actual.push(row);
                    closest.push((*column, row, cost[row][*column]));
                }
                None => unmatched_actual.push(row),
            }
        }
        let unmatched_expected: Vec<usize> = (0..expected_items.len())
            .filter(|column| !matched_expected[*column])
            .collect();
        if unmatched_actual.is_empty() && unmatched_expected.is_empty() {
            return;
        }

        let list = |items: &'g [NodeId], indices: &[usize]| -> String {
            let rendered: Vec<String> = indices.iter().map(|i| self.render(self.node(items[*i]))).collect();
            format!("[{}]", rendered.join(", "))
        };
        let mut lines = Vec::new();
        if !unmatched_expected.is_empty() {
            lines.push(format!(
                "expected elements not found in actual: {}",
                list(expected_items, &unmatched_expected)
            ));
        }
        if !unmatched_actual.is_empty() {
            lines.push(format!(
                "actual elements not found in expected: {}",
                list(actual_items, &unmatched_actual)
            ));
        }
        closest.sort_unstable();
        for (column, row, differences) in closest {
            lines.push(format!(
                "closest match for expected element {} was actual element {} ({differences} difference(s))",
                self.render(self.node(expected_items[column])),
                self.render(self.node(actual_items[row])),
            ));
        }
        self.report(dual, DifferenceKind::UnorderedCollectionMismatch, Some(lines.join("\n")));
    }

    fn visible_entries(&self, path: &FieldPath, entries: &'g [MapEntry]) -> Vec<&'g MapEntry> {
        entries
            .iter()
            .filter(|entry| self.reportable(&path.key(&entry.key)))
            .collect()
    }

    fn compare_maps(
        &mut self,
        dual: &DualValue,
        actual: NodeRef<'g>,
        expected: NodeRef<'g>,
        stack: &mut Vec<Task>,
    ) {
        let NodeKind::Map {
            entries: expected_entries,
            ..
        } = expected.kind()
        else {
            return;
        };
        let NodeKind::Map {
            entries: actual_entries,
            ..
        } = actual.kind()
        else {
            self.category_mismatch(dual, expected, actual);
            return;
        };
        let actual_entries = self.visible_entries(&dual.path, actual_entries);
        let expected_entries = self.visible_entries(&dual.path, expected_entries);

        let policy = self.config.map_policy();
        if !policy.visits_values() {
            let nested = self.differences_of(|walk, stack| {
                walk.schedule_entries(dual, &actual_entries, &expected_entries, stack)
            });
            if !nested.is_empty() {
                let description = format!("maps differ in {} entr(y/ies)", nested.len());
                self.value_mismatch(dual, Some(description));
            }
            return;
        }
        if policy.visits_object() && actual_entries.len() != expected_entries.len() {
            let description = format!(
                "actual size {} differs from expected size {}",
                actual_entries.len(),
                expected_entries.len()
            );
            self.report(dual, DifferenceKind::SizeMismatch, Some(description));
        }
        self.schedule_entries(dual, &actual_entries, &expected_entries, stack);
    }

    /// Common keys are compared by value; keys on one side only are
    /// reported as missing (actual only) or extra (expected only).
    fn schedule_entries(
        &mut self,
        dual: &DualValue,
        actual_entries: &[&'g MapEntry],
        expected_entries: &[&'g MapEntry],
        stack: &mut Vec<Task>,
    ) {
        let mut tasks = Vec::with_capacity(expected_entries.len());
        for expected in expected_entries {
            let path = dual.path.key(&expected.key);
            let task = match actual_entries.iter().find(|actual| actual.key == expected.key) {
                Some(actual) => Task::Compare(DualValue {
                    path,
                    actual: actual.value,
                    expected: expected.value,
                }),
                None => Task::Report(Box::new(self.difference(
                    path,
                    DifferenceKind::ExtraField,
                    None,
                    Some(self.node(expected.value)),
                    None,
                ))),
            };
            tasks.push(task);
        }
        for actual in actual_entries {
            if expected_entries.iter().any(|expected| expected.key == actual.key) {
                continue;
            }
            tasks.push(Task::Report(Box::new(self.difference(
                dual.path.key(&actual.key),
                DifferenceKind::MissingField,
                Some(self.node(actual.value)),
                None,
                None,
            ))));
        }
        stack.extend(tasks.into_iter().rev());
    }

    fn compare_optionals(
        &mut self,
        dual: &DualValue,
        actual: NodeRef<'g>,
        expected: NodeRef<'g>,
        stack: &mut Vec<Task>,
    ) {
        let NodeKind::Optional(expected_value) = expected.kind() else {
            return;
        };
        let NodeKind::Optional(actual_value) = actual.kind() else {
            self.category_mismatch(dual, expected, actual);
            return;
        };
        let (actual_value, expected_value) = match (actual_value, expected_value) {
            (None, None) => return,
            (Some(actual_value), Some(expected_value)) => (*actual_value, *expected_value),
            (Some(present), None) | (None, Some(present))
                if self.config.treats_null_and_empty_iterables_as_equal()
                    && is_empty_iterable(self.node(*present)) =>
            {
                return;
            }
            (Some(_), None) => {
                self.value_mismatch(dual, Some("expected an empty optional but actual was present".into()));
                return;
            }
            (None, Some(_)) => {
                self.value_mismatch(dual, Some("expected a present optional but actual was empty".into()));
                return;
            }
        };
        let content = DualValue {
            path: dual.path.field(crate::accessor::OPTIONAL_VALUE),
            actual: actual_value,
            expected: expected_value,
        };
        if self.config.optional_policy().visits_value() {
            stack.push(Task::Compare(content));
            return;
        }
        let nested = self.differences_of(|_, stack| stack.push(Task::Compare(content)));
        if !nested.is_empty() {
            self.value_mismatch(dual, None);
        }
    }

    fn compare_beans(
        &mut self,
        dual: &DualValue,
        actual: NodeRef<'g>,
        expected: NodeRef<'g>,
        stack: &mut Vec<Task>,
    ) {
        if let Some(equal) = self.enum_matches_string(actual, expected) {
            if !equal {
                self.value_mismatch(dual, None);
            }
            return;
        }
        let NodeKind::Bean {
            variant: expected_variant,
            ..
        } = expected.kind()
        else {
            return;
        };
        let NodeKind::Bean {
            variant: actual_variant,
            ..
        } = actual.kind()
        else {
            self.category_mismatch(dual, expected, actual);
            return;
        };
        if actual_variant != expected_variant {
            let description = format!(
                "actual variant {} differs from expected variant {}",
                actual_variant.unwrap_or("(none)"),
                expected_variant.unwrap_or("(none)")
            );
            self.value_mismatch(dual, Some(description));
            return;
        }

        let actual_members = self.accessor.members(actual);
        let expected_members = self.accessor.members(expected);
        let mut tasks = Vec::with_capacity(expected_members.len());
        for member in &expected_members {
            let path = dual.path.field(&member.name);
            match actual_members.iter().find(|other| other.name == member.name) {
                Some(other) => tasks.push(Task::Compare(DualValue {
                    path,
                    actual: other.node,
                    expected: member.node,
                })),
                None if self.reportable(&path) => tasks.push(Task::Report(Box::new(self.difference(
                    path,
                    DifferenceKind::ExtraField,
                    None,
                    Some(self.node(member.node)),
                    Some(format!(
                        "{} has no member `{}`",
                        actual.type_key().short_name(),
                        member.name
                    )),
                )))),
                None => {}
            }
        }
        for member in &actual_members {
            if expected_members.iter().any(|other| other.name == member.name) {
                continue;
            }
            let path = dual.path.field(&member.name);
            if self.reportable(&path) {
                tasks.push(Task::Report(Box::new(self.difference(
                    path,
                    DifferenceKind::MissingField,
                    Some(self.node(member.node)),
                    None,
                    Some(format!(
                        "{} has no member `{}`",
                        expected.type_key().short_name(),
                        member.name
                    )),
                ))));
            }
        }
        stack.extend(tasks.into_iter().rev());
    }
}
