//! Strongly-typed ID wrappers for projects, capex records, suppliers and users
//!
//! A capex record carries both a `SupplierId` and a `ProjectId`; distinct
//! newtypes keep the two from being swapped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID, returning `None` for anything that isn't a UUID
            pub fn parse_opt(s: &str) -> Option<Self> {
                s.trim().parse().ok()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Try to parse the full UUID
                if let Ok(uuid) = Uuid::parse_str(s) {
                    return Ok(Self(uuid));
                }
                // Try stripping common prefixes
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ProjectId, "prj-");
define_id!(CapexId, "cpx-");
define_id!(SupplierId, "sup-");
define_id!(UserId, "usr-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_prefix() {
        let id = ProjectId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("prj-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_id_serialization_is_bare_uuid() {
        let id = CapexId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let deserialized: CapexId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_from_str_accepts_full_uuid_with_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let plain: SupplierId = uuid_str.parse().unwrap();
        let prefixed: SupplierId = format!("sup-{}", uuid_str).parse().unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_short_display_does_not_parse() {
        let id = UserId::new();
        assert!(id.to_string().parse::<UserId>().is_err());
    }
}
