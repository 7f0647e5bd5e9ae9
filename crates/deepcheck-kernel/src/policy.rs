//! Traversal policies for containers.
//!
//! Each container family (collections, maps, optionals) can be treated as a
//! single value, as a transparent holder of its elements, or as both. The
//! comparison engine and the assertion walker read the same policies.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// How collections and arrays are traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionAssertionPolicy {
    /// Only the elements are visited. A size difference surfaces as
    /// missing or extra elements.
    #[default]
    ElementsOnly,
    /// The collection is one value; its elements are not visited.
    CollectionObjectOnly,
    /// The collection itself (its size) and then each element.
    CollectionObjectAndElements,
}

impl CollectionAssertionPolicy {
    pub fn visits_object(self) -> bool {
        !matches!(self, Self::ElementsOnly)
    }

    pub fn visits_elements(self) -> bool {
        !matches!(self, Self::CollectionObjectOnly)
    }
}

/// How maps are traversed. Keys are never recursed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapAssertionPolicy {
    MapObjectOnly,
    #[default]
    MapValuesOnly,
    MapObjectAndEntries,
}

impl MapAssertionPolicy {
    pub fn visits_object(self) -> bool {
        !matches!(self, Self::MapValuesOnly)
    }

    pub fn visits_values(self) -> bool {
        !matches!(self, Self::MapObjectOnly)
    }
}

/// How optionals are traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalAssertionPolicy {
    #[default]
    OptionalValueOnly,
    OptionalObjectOnly,
    OptionalObjectAndValue,
}

impl OptionalAssertionPolicy {
    pub fn visits_object(self) -> bool {
        !matches!(self, Self::OptionalValueOnly)
    }

    pub fn visits_value(self) -> bool {
        !matches!(self, Self::OptionalObjectOnly)
    }
}

macro_rules! policy_names {
    ($ty:ident, $family:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().replace('-', "_").as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ConfigError::UnknownPolicy {
                        family: $family,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

policy_names!(CollectionAssertionPolicy, "collection", {
    ElementsOnly => "elements_only",
    CollectionObjectOnly => "collection_object_only",
    CollectionObjectAndElements => "collection_object_and_elements",
});

policy_names!(MapAssertionPolicy, "map", {
    MapObjectOnly => "map_object_only",
    MapValuesOnly => "map_values_only",
    MapObjectAndEntries => "map_object_and_entries",
});

policy_names!(OptionalAssertionPolicy, "optional", {
    OptionalValueOnly => "optional_value_only",
    OptionalObjectOnly => "optional_object_only",
    OptionalObjectAndValue => "optional_object_and_value",
});
