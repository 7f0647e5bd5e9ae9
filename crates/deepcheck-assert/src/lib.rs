//! # Deepcheck Assert
//!
//! Fluent entry points over the deepcheck kernel. `assert_that` starts a
//! chain; `using_recursive_comparison` compares two values field by field,
//! `using_recursive_assertion` checks one predicate against every field.
//!
//! Each terminal comes in two flavours: the plain one panics with the full
//! diagnostic (for `#[test]` bodies), the `try_` one returns it as an
//! [`AssertionError`].
//!
//! ```
//! use deepcheck_assert::{assert_that, introspect};
//!
//! struct Book {
//!     title: String,
//!     pages: u32,
//! }
//!
//! introspect!(Book { title, pages });
//!
//! let dune = Book { title: "Dune".into(), pages: 412 };
//! let reprint = Book { title: "Dune".into(), pages: 412 };
//! assert_that(&dune).using_recursive_comparison().is_equal_to(&reprint);
//!
//! let abridged = Book { title: "Dune".into(), pages: 300 };
//! let error = assert_that(&dune)
//!     .using_recursive_comparison()
//!     .try_is_equal_to(&abridged)
//!     .unwrap_err();
//! assert!(error.to_string().contains("field/property 'pages' differ"));
//!
//! assert_that(&dune)
//!     .using_recursive_comparison()
//!     .ignoring_fields(["pages"])
//!     .is_equal_to(&abridged);
//! ```

mod error;
mod object;
mod recursive_assertion;
mod recursive_comparison;

pub use deepcheck_kernel as kernel;
pub use deepcheck_kernel::introspect;
pub use error::AssertionError;
pub use object::{Extracted, ObjectAssert, assert_that};
pub use recursive_assertion::RecursiveAssertionAssert;
pub use recursive_comparison::{RecursiveComparisonAssert, recursively_equal};
