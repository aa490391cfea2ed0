//! Type-safe identifier wrappers around [`String`].
//!
//! Scenario data names every entity with a short human-readable slug
//! (`"sol"`, `"l1-2"`, `"refine_alloy"`). Each kind of entity gets its own
//! newtype so a world id can never be passed where a lane id is expected.
//! All ids serialize as plain strings (serde's newtype encoding) and order
//! lexicographically, which is what keeps `BTreeMap` iteration (and
//! therefore RNG draw order) stable between runs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(#[ts(type = "string")] pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a world (node in the galaxy graph).
    WorldId
}

define_id! {
    /// Unique identifier for a lane (edge in the galaxy graph).
    LaneId
}

define_id! {
    /// Unique identifier for a faction.
    FactionId
}

define_id! {
    /// Unique identifier for a tradeable commodity.
    CommodityId
}

define_id! {
    /// Unique identifier for a production recipe.
    RecipeId
}

define_id! {
    /// Unique identifier for an event definition.
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_content() {
        assert_eq!(WorldId::new("sol"), WorldId::from("sol"));
        assert!(WorldId::from("alpha") < WorldId::from("beta"));
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = CommodityId::from("food");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"food\""));
        let restored: Result<CommodityId, _> = serde_json::from_str("\"food\"");
        assert_eq!(restored.ok(), Some(id));
    }

    #[test]
    fn ids_bind_to_typescript_strings() {
        use ts_rs::TS;

        assert_eq!(WorldId::inline(), "string");
        assert_eq!(EventId::inline(), "string");
        assert!(LaneId::decl().contains("string"));
    }

    #[test]
    fn ids_look_up_maps_by_str() {
        let mut prices = std::collections::BTreeMap::new();
        prices.insert(CommodityId::from("food"), 10.0_f64);
        assert!(prices.contains_key("food"));
        assert!(!prices.contains_key("ore"));
    }

    #[test]
    fn id_display_matches_inner() {
        let id = LaneId::from("l1-2");
        assert_eq!(id.to_string(), "l1-2");
        assert_eq!(id.as_str(), "l1-2");
    }
}
