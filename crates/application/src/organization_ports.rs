use async_trait::async_trait;

use warden_core::{AppResult, NonEmptyString};
use warden_domain::{AuditStamp, Member, MemberId, Organization, OrganizationId};

/// Validated organization row handed to the repository for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    /// Organization name.
    pub name: NonEmptyString,
    /// Parent node, `None` for a root.
    pub parent_id: Option<OrganizationId>,
    /// Position among siblings.
    pub sequence: u32,
    /// Creation stamp.
    pub audit: AuditStamp,
}

/// Repository port for organization nodes and their assignments.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Lists every organization with resolved roles and member ids.
    async fn list_organizations(&self) -> AppResult<Vec<Organization>>;

    /// Finds one organization.
    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>>;

    /// Lists the organizations `member_id` belongs to, ordered by id.
    async fn list_organizations_for_member(
        &self,
        member_id: MemberId,
    ) -> AppResult<Vec<Organization>>;

    /// Inserts an organization without roles or members.
    async fn create_organization(&self, input: NewOrganization) -> AppResult<Organization>;

    /// Persists name, parent, sequence and audit stamp of every given node
    /// atomically.
    async fn update_organizations(&self, organizations: &[Organization]) -> AppResult<()>;

    /// Replaces the stored role links with `organization.roles()`.
    async fn save_role_assignments(&self, organization: &Organization) -> AppResult<()>;

    /// Replaces the stored member links with `organization.member_ids()`.
    async fn save_member_assignments(&self, organization: &Organization) -> AppResult<()>;

    /// Deletes the given nodes in order, atomically.
    async fn delete_organizations(&self, organization_ids: &[OrganizationId]) -> AppResult<()>;
}

/// Read port for members owned by the identity subsystem.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Finds a member with directly assigned roles.
    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<Member>>;

    /// Finds a member by login name.
    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<Member>>;

    /// Returns the ids from `member_ids` that exist, in the given order.
    async fn existing_member_ids(&self, member_ids: &[MemberId]) -> AppResult<Vec<MemberId>>;
}
