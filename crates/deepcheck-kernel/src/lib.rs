//! # Deepcheck Kernel
//!
//! Recursive comparison and recursive assertion over arbitrary object
//! graphs. Two values are equal "field by field" when every path reachable
//! from their roots leads to equal leaves, under a configuration that can
//! ignore fields, override comparison per type or per field, and relax
//! ordering of collections.
//!
//! Values are first described into an arena snapshot, so the engine never
//! touches live values: cycles become back-edges between node ids and the
//! walk is a plain loop over an explicit work stack.
//!
//! ## Architecture
//!
//! ```text
//! Introspect              ← Values describe their members
//!     │
//! ObjectGraph / NodeRef   ← Arena snapshot, NodeId identity
//!     │
//! PropertyAccessor        ← Member lookup, `a.b[0].c` paths
//!     │
//! Configuration           ← Ignores, comparators, policies
//!     │
//! RecursiveComparator     ← Dual walk → ComparisonDifference*
//! RecursiveAssertionDriver← Single walk → PredicateFailure*
//!     │
//! report                  ← One failure message
//! ```

pub mod accessor;
pub mod assertion_config;
pub mod assignment;
pub mod comparator;
pub mod compare;
pub mod config;
pub mod cycle;
pub mod difference;
pub mod error;
pub mod graph;
pub mod introspect;
pub mod json;
pub mod path;
pub mod policy;
pub mod report;
pub mod repr;
pub mod walker;

pub use accessor::{IntrospectionStrategy, OPTIONAL_VALUE, PropertyAccessor};
pub use assertion_config::{RecursiveAssertionConfiguration, RecursiveAssertionConfigurationBuilder};
pub use comparator::{Comparator, FieldComparators, TypeComparators};
pub use compare::{DualValue, RecursiveComparator, determine_differences};
pub use config::{ComparisonProfile, RecursiveComparisonConfiguration, RecursiveComparisonConfigurationBuilder};
pub use cycle::CycleTracker;
pub use difference::{ComparisonDifference, DifferenceKind, PredicateFailure};
pub use error::{ComparisonError, ConfigError, IntrospectionError};
pub use graph::{NodeId, NodeKind, NodeRef, ObjectGraph, SequenceKind, TypeKey};
pub use introspect::{BeanBuilder, GraphBuilder, Introspect, Snapshot};
pub use path::{FieldPath, Segment};
pub use policy::{CollectionAssertionPolicy, MapAssertionPolicy, OptionalAssertionPolicy};
pub use repr::{Representation, represent};
pub use walker::RecursiveAssertionDriver;
