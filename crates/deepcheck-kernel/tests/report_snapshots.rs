//! Snapshots of rendered failure messages.

use deepcheck_kernel::report::{render, render_failure, render_predicate_failures};
use deepcheck_kernel::{
    RecursiveAssertionConfiguration, RecursiveAssertionDriver, RecursiveComparisonConfiguration, Snapshot,
    determine_differences, represent,
};
use serde_json::json;

struct Book {
    title: String,
    pages: u32,
}

deepcheck_kernel::introspect!(Book { title, pages });

#[test]
fn comparison_failure_message() {
    let actual = Book {
        title: "Dune".into(),
        pages: 412,
    };
    let expected = Book {
        title: "Emma".into(),
        pages: 400,
    };
    let config = RecursiveComparisonConfiguration::default();
    let differences = determine_differences(&actual, &expected, &config).unwrap();
    let snapshot = Snapshot::of_pair(&actual, &expected);
    let message = render_failure(
        &represent(snapshot.actual()),
        &represent(snapshot.expected()),
        &differences,
        &config,
    );
    insta::assert_snapshot!(
        message.trim_end(),
        @r###"Expecting actual:
  Book { title: "Dune", pages: 412 }
to be equal to:
  Book { title: "Emma", pages: 400 }
when recursively comparing field by field, but found the following 2 differences:

field/property 'title' differ:
- actual value  : "Dune"
- expected value: "Emma"

field/property 'pages' differ:
- actual value  : 412
- expected value: 400

The recursive comparison was performed with this configuration:
- no overridden equals were used in the comparison (except for types in std::, core::, alloc::)
- these types were compared with the following comparators:
  - f32 -> f32 within 1e-6
  - f64 -> f64 within 1e-15
- actual and expected objects and their fields were compared field by field recursively even if they were not of the same type
- collections were compared with the elements_only policy, maps with the map_values_only policy and optionals with the optional_value_only policy"###
    );
}

#[test]
fn unordered_mismatch_lists_leftovers() {
    let config = RecursiveComparisonConfiguration::builder()
        .ignoring_collection_order()
        .build()
        .unwrap();
    let differences = determine_differences(&vec!["a", "b", "x"], &vec!["b", "a", "c"], &config).unwrap();
    insta::assert_snapshot!(
        render(&differences),
        @r###"Top level actual and expected objects differ:
- actual value  : ["a", "b", "x"]
- expected value: ["b", "a", "c"]
expected elements not found in actual: ["c"]
actual elements not found in expected: ["x"]
closest match for expected element "c" was actual element "x" (1 difference(s))"###
    );
}

#[test]
fn predicate_failure_message() {
    let value = json!({"a": {"b": {"c": null}}, "d": 1});
    let config = RecursiveAssertionConfiguration::default();
    let failures =
        RecursiveAssertionDriver::new(&config).assert_over_value(&value, |node| !node.is_null(), "is not null");
    let message = render_predicate_failures(&represent(Snapshot::of(&value).root()), &failures, &config);
    insta::assert_snapshot!(
        message.trim_end(),
        @r###"Expecting actual:
  {a: {b: {c: null}}, d: 1}
to satisfy the given assertion recursively (is not null) but the following fields did not:
- a.b.c: null

The recursive assertion was performed with this configuration:
- the assertion did not recurse into types in std::, core::, alloc::
- collections were traversed with the elements_only policy, maps with the map_values_only policy and optionals with the optional_value_only policy"###
    );
}
