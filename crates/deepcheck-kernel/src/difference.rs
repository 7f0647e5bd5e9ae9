//! Outcomes of a walk.
//!
//! [`ComparisonDifference`] is one divergence found by the comparison
//! engine; [`PredicateFailure`] is one node rejected by the assertion
//! walker. Both carry the path leading to the offending node and are
//! immutable once produced.

use serde::Serialize;

use crate::path::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// Strict type checking saw two different runtime types.
    TypeMismatch,
    ValueMismatch,
    /// Present in actual, missing from expected.
    MissingField,
    /// Present in expected only: an extra the actual value lacks.
    ExtraField,
    /// Collection or map sizes differ (object-level policies only).
    SizeMismatch,
    /// Elements of an unordered collection found no equal partner.
    UnorderedCollectionMismatch,
}

impl DifferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::ValueMismatch => "value_mismatch",
            Self::MissingField => "missing_field",
            Self::ExtraField => "extra_field",
            Self::SizeMismatch => "size_mismatch",
            Self::UnorderedCollectionMismatch => "unordered_collection_mismatch",
        }
    }
}

impl std::fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One divergence between actual and expected.
///
/// `actual` and `expected` are rendered representations; `None` stands for
/// a side that has no value at this path (missing or extra members).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonDifference {
    pub path: FieldPath,
    pub kind: DifferenceKind,
    pub actual: Option<String>,
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl ComparisonDifference {
    pub fn new(
        path: FieldPath,
        kind: DifferenceKind,
        actual: Option<String>,
        expected: Option<String>,
    ) -> Self {
        Self {
            path,
            kind,
            actual,
            expected,
            description: None,
            custom_message: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_custom_message(mut self, message: Option<String>) -> Self {
        self.custom_message = message;
        self
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }
}

/// A node the assertion predicate rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateFailure {
    pub path: FieldPath,
    pub value: String,
    pub predicate: String,
}
