//! Numeric identifiers assigned by the backing store.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::AppError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from a raw store value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw store value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.trim().parse::<u64>().map(Self).map_err(|error| {
                    AppError::Validation(format!("invalid {} '{value}': {error}", $label))
                })
            }
        }
    };
}

numeric_id!(
    /// Identifier of a permission entry.
    PermissionId,
    "permission id"
);
numeric_id!(
    /// Identifier of a role entry.
    RoleId,
    "role id"
);
numeric_id!(
    /// Identifier of an organization node.
    OrganizationId,
    "organization id"
);
numeric_id!(
    /// Identifier of a member (the authenticated principal).
    MemberId,
    "member id"
);

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{MemberId, OrganizationId};

    #[test]
    fn parses_transport_values() {
        let parsed = OrganizationId::from_str(" 21 ");
        assert_eq!(parsed.ok(), Some(OrganizationId::new(21)));
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(MemberId::from_str("abc").is_err());
        assert!(MemberId::from_str("-1").is_err());
    }
}
