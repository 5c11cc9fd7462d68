//! Organization tree use-cases.
//!
//! Structural checks run against a fresh [`OrganizationTree`] snapshot built
//! from the repository on each call. Multi-row changes are handed to the
//! repository in a single call so they commit or roll back together.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use warden_core::{ActorIdentity, AppError, AppResult, NonEmptyString};
use warden_domain::{
    AuditStamp, MemberId, Organization, OrganizationId, OrganizationTree, RoleId,
};

use crate::organization_ports::{MemberRepository, NewOrganization, OrganizationRepository};
use crate::registry_ports::AccessRegistryRepository;

mod assignments;
mod queries;
mod structure;

/// Application service for the organization hierarchy.
#[derive(Clone)]
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
    registry: Arc<dyn AccessRegistryRepository>,
    members: Arc<dyn MemberRepository>,
}

impl OrganizationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        registry: Arc<dyn AccessRegistryRepository>,
        members: Arc<dyn MemberRepository>,
    ) -> Self {
        Self {
            organizations,
            registry,
            members,
        }
    }

    async fn load_tree(&self) -> AppResult<(Vec<Organization>, OrganizationTree)> {
        let organizations = self.organizations.list_organizations().await?;
        let tree = OrganizationTree::from_organizations(&organizations);
        Ok((organizations, tree))
    }
}

fn not_found(organization_id: OrganizationId) -> AppError {
    AppError::NotFound(format!("organization '{organization_id}' was not found"))
}

#[cfg(test)]
mod tests;
