use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use warden_application::{AccessRegistryRepository, NewPermission, NewRole};
use warden_core::{AppError, AppResult};
use warden_domain::{AuditStamp, Permission, PermissionId, Role, RoleId};

use crate::postgres_rows::{
    PermissionRow, from_db_id, in_requested_order, internal, is_unique_violation, load_roles,
    to_db_id, to_db_ids, to_db_position,
};

mod permissions;
mod roles;

/// PostgreSQL-backed repository for permissions and roles.
#[derive(Clone)]
pub struct PostgresAccessRegistryRepository {
    pool: PgPool,
}

impl PostgresAccessRegistryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(internal("failed to begin transaction"))
    }
}

#[async_trait]
impl AccessRegistryRepository for PostgresAccessRegistryRepository {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl().await
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        self.find_permission_impl(permission_id).await
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        self.find_permission_by_name_impl(name).await
    }

    async fn resolve_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        self.resolve_permissions_impl(permission_ids).await
    }

    async fn create_permission(&self, input: NewPermission) -> AppResult<Permission> {
        self.create_permission_impl(input).await
    }

    async fn update_permission(&self, permission: &Permission) -> AppResult<()> {
        self.update_permission_impl(permission).await
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.delete_permission_impl(permission_id).await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        load_roles(&self.pool, None).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let role_id = to_db_id(role_id.get())?;
        Ok(load_roles(&self.pool, Some(&[role_id]))
            .await?
            .into_iter()
            .next())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.find_role_by_name_impl(name).await
    }

    async fn resolve_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let ids = to_db_ids(role_ids.iter().map(|role_id| role_id.get()))?;
        let roles = load_roles(&self.pool, Some(&ids)).await?;
        Ok(in_requested_order(roles, role_ids))
    }

    async fn create_role(&self, input: NewRole) -> AppResult<Role> {
        self.create_role_impl(input).await
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        self.update_role_impl(role).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.delete_role_impl(role_id).await
    }
}

fn map_permission_conflict(error: sqlx::Error, name: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::DuplicateName(format!("permission '{name}' already exists"));
    }

    AppError::Internal(format!("failed to persist permission: {error}"))
}
