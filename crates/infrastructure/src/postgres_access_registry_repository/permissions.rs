use std::collections::HashMap;

use super::*;

impl PostgresAccessRegistryRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, kind, name, description, created_by, updated_by, created_at, updated_at
            FROM permissions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to list permissions"))?
        .into_iter()
        .map(PermissionRow::into_permission)
        .collect()
    }

    pub(super) async fn find_permission_impl(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, kind, name, description, created_by, updated_by, created_at, updated_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(to_db_id(permission_id.get())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("failed to find permission"))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    pub(super) async fn find_permission_by_name_impl(
        &self,
        name: &str,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, kind, name, description, created_by, updated_by, created_at, updated_at
            FROM permissions
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("failed to find permission by name"))?
        .map(PermissionRow::into_permission)
        .transpose()
    }

    pub(super) async fn resolve_permissions_impl(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = to_db_ids(permission_ids.iter().map(|id| id.get()))?;
        let mut by_id: HashMap<PermissionId, Permission> = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, kind, name, description, created_by, updated_by, created_at, updated_at
            FROM permissions
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to resolve permissions"))?
        .into_iter()
        .map(|row| row.into_permission().map(|permission| (permission.id(), permission)))
        .collect::<AppResult<_>>()?;

        Ok(permission_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    pub(super) async fn create_permission_impl(
        &self,
        input: NewPermission,
    ) -> AppResult<Permission> {
        let audit = input.audit.clone();
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO permissions
                (kind, name, description, created_by, updated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.kind.as_str())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(audit.created_by())
        .bind(audit.updated_by())
        .bind(audit.created_at())
        .bind(audit.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_permission_conflict(error, input.name.as_str()))?;

        Permission::new(
            PermissionId::new(from_db_id(id)?),
            input.kind,
            input.name,
            input.description,
            audit,
        )
    }

    pub(super) async fn update_permission_impl(&self, permission: &Permission) -> AppResult<()> {
        let audit: &AuditStamp = permission.audit();
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET name = $2, description = $3, updated_by = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(to_db_id(permission.id().get())?)
        .bind(permission.name())
        .bind(permission.description())
        .bind(audit.updated_by())
        .bind(audit.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_permission_conflict(error, permission.name()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{}' was not found",
                permission.id()
            )));
        }

        Ok(())
    }

    pub(super) async fn delete_permission_impl(&self, permission_id: PermissionId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(to_db_id(permission_id.get())?)
            .execute(&self.pool)
            .await
            .map_err(internal("failed to delete permission"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        Ok(())
    }
}
