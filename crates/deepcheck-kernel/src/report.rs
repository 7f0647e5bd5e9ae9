//! Rendering of differences and predicate failures into failure messages.
//!
//! ```text
//! field/property 'books[1].title' differ:
//! - actual value  : "Dune"
//! - expected value: "Emma"
//! ```

use std::fmt::{self, Write as _};

use crate::difference::{ComparisonDifference, PredicateFailure};

const ABSENT: &str = "(absent)";

/// One difference as a multi-line block. A custom message replaces the
/// whole block.
pub fn describe(difference: &ComparisonDifference) -> String {
    if let Some(message) = &difference.custom_message {
        return message.clone();
    }
    let mut out = if difference.is_root() {
        String::from("Top level actual and expected objects differ:\n")
    } else {
        format!("field/property '{}' differ:\n", difference.path)
    };
    let _ = writeln!(
        out,
        "- actual value  : {}",
        difference.actual.as_deref().unwrap_or(ABSENT)
    );
    let _ = write!(
        out,
        "- expected value: {}",
        difference.expected.as_deref().unwrap_or(ABSENT)
    );
    if let Some(description) = &difference.description {
        out.push('\n');
        out.push_str(description);
    }
    out
}

/// All differences, blank-line separated, in the order given.
pub fn render(differences: &[ComparisonDifference]) -> String {
    differences
        .iter()
        .map(describe)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The full message of a failed recursive comparison.
pub fn render_failure(
    actual: &str,
    expected: &str,
    differences: &[ComparisonDifference],
    configuration: &dyn fmt::Display,
) -> String {
    let count = differences.len();
    let noun = if count == 1 { "difference" } else { "differences" };
    format!(
        "Expecting actual:\n  {actual}\nto be equal to:\n  {expected}\n\
         when recursively comparing field by field, but found the following {count} {noun}:\n\n\
         {}\n\n\
         The recursive comparison was performed with this configuration:\n{configuration}",
        render(differences)
    )
}

/// The full message of a failed recursive assertion.
pub fn render_predicate_failures(
    root: &str,
    failures: &[PredicateFailure],
    configuration: &dyn fmt::Display,
) -> String {
    let mut out = format!("Expecting actual:\n  {root}\nto satisfy the given assertion recursively");
    if let Some(first) = failures.first() {
        let _ = write!(out, " ({})", first.predicate);
    }
    out.push_str(" but the following fields did not:\n");
    for failure in failures {
        let _ = writeln!(out, "- {}: {}", failure.path, failure.value);
    }
    let _ = write!(
        out,
        "\nThe recursive assertion was performed with this configuration:\n{configuration}"
    );
    out
}
