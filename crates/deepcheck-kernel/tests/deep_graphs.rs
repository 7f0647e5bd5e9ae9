//! Values nested far deeper than the call stack could follow.

use deepcheck_kernel::{
    DifferenceKind, RecursiveAssertionConfiguration, RecursiveAssertionDriver, RecursiveComparisonConfiguration,
    Snapshot, determine_differences,
};
use serde_json::Value;

fn nested(depth: usize, bottom: Value) -> Value {
    let mut value = bottom;
    for _ in 0..depth {
        value = Value::Array(vec![value]);
    }
    value
}

/// Dropping a deep `Value` recurses, so tests take it apart by hand.
fn unwind(mut value: Value) {
    while let Value::Array(mut items) = value {
        value = items.pop().unwrap_or(Value::Null);
    }
}

#[test]
fn snapshot_of_a_hundred_thousand_levels() {
    let value = nested(100_000, Value::Bool(true));
    let snapshot = Snapshot::of(&value);
    assert_eq!(snapshot.graph().len(), 100_001);
    drop(snapshot);
    unwind(value);
}

#[test]
fn difference_at_the_bottom_of_a_deep_document() {
    let actual = nested(5_000, Value::from("left"));
    let expected = nested(5_000, Value::from("right"));

    let differences =
        determine_differences(&actual, &expected, &RecursiveComparisonConfiguration::default()).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].kind, DifferenceKind::ValueMismatch);
    assert_eq!(differences[0].path.depth(), 5_000);
    assert!(differences[0].path.render().starts_with("[0][0][0]"));

    unwind(actual);
    unwind(expected);
}

#[test]
fn assertion_reaches_the_bottom_of_a_deep_document() {
    let value = nested(5_000, Value::Null);
    let config = RecursiveAssertionConfiguration::default();
    let failures =
        RecursiveAssertionDriver::new(&config).assert_over_value(&value, |node| !node.is_null(), "is not null");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path.depth(), 5_000);
    unwind(value);
}
