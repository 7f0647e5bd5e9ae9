//! Integration tests: run the JSON comparison vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: the actual and expected documents, plus an optional
//!   comparison profile
//! - expect.json: the differences the comparison must report, as
//!   `{path, kind}` pairs in discovery order

use deepcheck_kernel::{ComparisonProfile, RecursiveComparisonConfiguration, determine_differences};
use serde_json::{Value, json};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &PathBuf) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expect.json"));

    let profile: ComparisonProfile = match case.get("profile") {
        Some(profile) => serde_json::from_value(profile.clone())
            .unwrap_or_else(|e| panic!("invalid profile in {name}: {e}")),
        None => ComparisonProfile::default(),
    };
    let config = RecursiveComparisonConfiguration::from_profile(profile)
        .unwrap_or_else(|e| panic!("profile of {name} does not build: {e}"));

    let differences = determine_differences(&case["actual"], &case["expected"], &config)
        .unwrap_or_else(|e| panic!("comparison of {name} failed: {e}"));
    let got: Vec<Value> = differences
        .iter()
        .map(|difference| json!({"path": difference.path.render(), "kind": difference.kind}))
        .collect();
    let got = json!({ "differences": got });

    assert_eq!(
        got,
        expected,
        "\n\nFixture: {name} ({})\n\nGot:\n{}\n\nExpected:\n{}\n",
        case["description"].as_str().unwrap_or_default(),
        serde_json::to_string_pretty(&got).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn equal_documents() {
    run_fixture("equal_documents");
}

#[test]
fn nested_value_mismatch() {
    run_fixture("nested_value_mismatch");
}

#[test]
fn map_missing_and_extra() {
    run_fixture("map_missing_and_extra");
}

#[test]
fn list_order_differs() {
    run_fixture("list_order_differs");
}

#[test]
fn list_order_ignored() {
    run_fixture("list_order_ignored");
}

#[test]
fn unordered_leftovers() {
    run_fixture("unordered_leftovers");
}

#[test]
fn ignored_fields() {
    run_fixture("ignored_fields");
}

#[test]
fn surplus_elements() {
    run_fixture("surplus_elements");
}

#[test]
fn null_against_value() {
    run_fixture("null_against_value");
}

#[test]
fn null_equals_empty_iterable() {
    run_fixture("null_equals_empty_iterable");
}

#[test]
fn collection_object_only() {
    run_fixture("collection_object_only");
}

#[test]
fn collection_object_and_elements() {
    run_fixture("collection_object_and_elements");
}

#[test]
fn strict_type_checking() {
    run_fixture("strict_type_checking");
}

#[test]
fn compared_fields_only() {
    run_fixture("compared_fields_only");
}
