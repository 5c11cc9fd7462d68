use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{ActorIdentity, AppError, AppResult, NonEmptyString};

use crate::{AuditStamp, PermissionId, RoleId};

/// Origin of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// System-seeded entry that can never be renamed or deleted.
    Predefined,
    /// Administrator-created entry.
    UserDefined,
}

impl EntryKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predefined => "predefined",
            Self::UserDefined => "user_defined",
        }
    }
}

impl FromStr for EntryKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "predefined" => Ok(Self::Predefined),
            "user_defined" => Ok(Self::UserDefined),
            _ => Err(AppError::Validation(format!(
                "unknown entry kind value '{value}'"
            ))),
        }
    }
}

/// Named grant that can be attached to roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    kind: EntryKind,
    name: NonEmptyString,
    description: Option<String>,
    audit: AuditStamp,
}

impl Permission {
    /// Creates a validated permission.
    pub fn new(
        id: PermissionId,
        kind: EntryKind,
        name: impl Into<String>,
        description: Option<String>,
        audit: AuditStamp,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            kind,
            name: NonEmptyString::new(name)?,
            description: normalize_description(description),
            audit,
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns whether the permission is predefined or user-defined.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the globally unique permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the audit stamp.
    #[must_use]
    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Fails with `NonChangeable` for predefined permissions.
    pub fn ensure_changeable(&self) -> AppResult<()> {
        if self.kind == EntryKind::Predefined {
            return Err(AppError::NonChangeable(format!(
                "permission '{}' is predefined",
                self.name
            )));
        }

        Ok(())
    }

    /// Replaces name and description.
    pub fn update(
        &mut self,
        actor: &ActorIdentity,
        name: impl Into<String>,
        description: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_changeable()?;
        self.name = NonEmptyString::new(name)?;
        self.description = normalize_description(description);
        self.audit.touch(actor, at);
        Ok(())
    }
}

/// Named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    kind: EntryKind,
    name: NonEmptyString,
    description: Option<String>,
    permissions: Vec<Permission>,
    audit: AuditStamp,
}

impl Role {
    /// Creates a validated role.
    ///
    /// Permissions keep their given order; repeated ids are dropped after the
    /// first occurrence.
    pub fn new(
        id: RoleId,
        kind: EntryKind,
        name: impl Into<String>,
        description: Option<String>,
        permissions: Vec<Permission>,
        audit: AuditStamp,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            kind,
            name: NonEmptyString::new(name)?,
            description: normalize_description(description),
            permissions: dedup_permissions(permissions),
            audit,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns whether the role is predefined or user-defined.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns granted permissions in stored order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns the audit stamp.
    #[must_use]
    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Fails with `NonChangeable` for predefined roles.
    pub fn ensure_changeable(&self) -> AppResult<()> {
        if self.kind == EntryKind::Predefined {
            return Err(AppError::NonChangeable(format!(
                "role '{}' is predefined",
                self.name
            )));
        }

        Ok(())
    }

    /// Replaces name, description and the full permission list.
    pub fn update(
        &mut self,
        actor: &ActorIdentity,
        name: impl Into<String>,
        description: Option<String>,
        permissions: Vec<Permission>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_changeable()?;
        self.name = NonEmptyString::new(name)?;
        self.description = normalize_description(description);
        self.permissions = dedup_permissions(permissions);
        self.audit.touch(actor, at);
        Ok(())
    }
}

fn dedup_permissions(permissions: Vec<Permission>) -> Vec<Permission> {
    let mut seen = HashSet::new();
    permissions
        .into_iter()
        .filter(|permission| seen.insert(permission.id()))
        .collect()
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
