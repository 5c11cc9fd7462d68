use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::AppError;

/// Predefined permissions seeded at bootstrap and required by admin endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    /// Allows listing the organization tree.
    OrganizationRead,
    /// Allows creating, moving, renaming and deleting organizations.
    OrganizationManage,
    /// Allows listing roles and permissions.
    RegistryRead,
    /// Allows mutating user-defined roles and permissions.
    RegistryManage,
}

impl SystemPermission {
    /// Returns the stable permission name stored in the registry and tokens.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrganizationRead => "organization.read",
            Self::OrganizationManage => "organization.manage",
            Self::RegistryRead => "registry.read",
            Self::RegistryManage => "registry.manage",
        }
    }

    /// Returns a short description used when seeding.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::OrganizationRead => "View the organization tree",
            Self::OrganizationManage => "Create, move, rename and delete organizations",
            Self::RegistryRead => "View roles and permissions",
            Self::RegistryManage => "Manage user-defined roles and permissions",
        }
    }

    /// Returns all system permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemPermission] = &[
            SystemPermission::OrganizationRead,
            SystemPermission::OrganizationManage,
            SystemPermission::RegistryRead,
            SystemPermission::RegistryManage,
        ];

        ALL
    }
}

impl FromStr for SystemPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown system permission '{value}'")))
    }
}

/// Name of the predefined role granting every system permission.
pub const ADMINISTRATOR_ROLE: &str = "administrator";
