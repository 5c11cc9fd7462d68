//! Permission and role registry use-cases.
//!
//! Predefined entries are immutable and permission names are globally unique.
//! Every mutation records the acting subject in the entry's audit stamp.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use warden_core::{ActorIdentity, AppError, AppResult, NonEmptyString};
use warden_domain::{AuditStamp, EntryKind, Permission, PermissionId, Role, RoleId};

use crate::registry_ports::{
    AccessRegistryRepository, NewPermission, NewRole, PermissionInput, RoleInput,
};

mod permissions;
mod roles;
mod seed;

pub use seed::{PredefinedCatalog, PredefinedRole, SeedSummary};

/// Application service for the permission and role registry.
#[derive(Clone)]
pub struct RoleAccessService {
    repository: Arc<dyn AccessRegistryRepository>,
}

impl RoleAccessService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessRegistryRepository>) -> Self {
        Self { repository }
    }

    async fn ensure_unique_permission_name(
        &self,
        name: &str,
        except: Option<PermissionId>,
    ) -> AppResult<()> {
        let existing = self.repository.find_permission_by_name(name).await?;
        match existing {
            Some(permission) if Some(permission.id()) != except => Err(AppError::DuplicateName(
                format!("permission '{name}' already exists"),
            )),
            _ => Ok(()),
        }
    }
}
