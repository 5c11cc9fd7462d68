use async_trait::async_trait;

use warden_core::{AppResult, NonEmptyString};
use warden_domain::{AuditStamp, EntryKind, Permission, PermissionId, Role, RoleId};

/// Input payload for creating or updating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionInput {
    /// Globally unique permission name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// Input payload for creating or updating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInput {
    /// Role name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Permissions to grant, in display order. Unknown ids are ignored.
    pub permission_ids: Vec<PermissionId>,
}

/// Validated permission row handed to the repository for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermission {
    /// Predefined or user-defined.
    pub kind: EntryKind,
    /// Permission name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Creation stamp.
    pub audit: AuditStamp,
}

/// Validated role row handed to the repository for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Predefined or user-defined.
    pub kind: EntryKind,
    /// Role name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Already resolved permission ids, in stored order.
    pub permission_ids: Vec<PermissionId>,
    /// Creation stamp.
    pub audit: AuditStamp,
}

/// Repository port for the permission and role registry.
#[async_trait]
pub trait AccessRegistryRepository: Send + Sync {
    /// Lists every permission ordered by id.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Finds a permission by id.
    async fn find_permission(&self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Finds a permission by exact, case-sensitive name.
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Returns the permissions matching `permission_ids` in the given order,
    /// skipping ids that do not exist.
    async fn resolve_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>>;

    /// Inserts a permission and returns it with its assigned id.
    async fn create_permission(&self, input: NewPermission) -> AppResult<Permission>;

    /// Persists name, description and audit stamp of a permission.
    async fn update_permission(&self, permission: &Permission) -> AppResult<()>;

    /// Deletes a permission and detaches it from every role.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Lists every role with its permissions, ordered by id.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by exact name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Returns the roles matching `role_ids` in the given order, skipping ids
    /// that do not exist.
    async fn resolve_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// Inserts a role with its permission links.
    async fn create_role(&self, input: NewRole) -> AppResult<Role>;

    /// Persists a role including the full replacement of its permission links.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Deletes a role and detaches it from organizations and members.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;
}
