use super::*;

impl PostgresAccessRegistryRepository {
    pub(super) async fn find_role_by_name_impl(&self, name: &str) -> AppResult<Option<Role>> {
        let role_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM roles
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("failed to find role by name"))?;

        let Some(role_id) = role_id else {
            return Ok(None);
        };

        Ok(load_roles(&self.pool, Some(&[role_id]))
            .await?
            .into_iter()
            .next())
    }

    pub(super) async fn create_role_impl(&self, input: NewRole) -> AppResult<Role> {
        let mut transaction = self.begin().await?;

        let role_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO roles
                (kind, name, description, created_by, updated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.kind.as_str())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(input.audit.created_by())
        .bind(input.audit.updated_by())
        .bind(input.audit.created_at())
        .bind(input.audit.updated_at())
        .fetch_one(&mut *transaction)
        .await
        .map_err(internal("failed to create role"))?;

        let permission_ids: Vec<u64> = input.permission_ids.iter().map(|id| id.get()).collect();
        replace_role_permissions(&mut transaction, role_id, &permission_ids).await?;

        transaction
            .commit()
            .await
            .map_err(internal("failed to commit transaction"))?;

        load_roles(&self.pool, Some(&[role_id]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal(format!("created role '{role_id}' was not found")))
    }

    pub(super) async fn update_role_impl(&self, role: &Role) -> AppResult<()> {
        let role_id = to_db_id(role.id().get())?;
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3, updated_by = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .bind(role.name())
        .bind(role.description())
        .bind(role.audit().updated_by())
        .bind(role.audit().updated_at())
        .execute(&mut *transaction)
        .await
        .map_err(internal("failed to update role"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        let permission_ids: Vec<u64> = role
            .permissions()
            .iter()
            .map(|permission| permission.id().get())
            .collect();
        replace_role_permissions(&mut transaction, role_id, &permission_ids).await?;

        transaction
            .commit()
            .await
            .map_err(internal("failed to commit transaction"))
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(to_db_id(role_id.get())?)
            .execute(&self.pool)
            .await
            .map_err(internal("failed to delete role"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(())
    }
}

async fn replace_role_permissions(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: i64,
    permission_ids: &[u64],
) -> AppResult<()> {
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **transaction)
        .await
        .map_err(internal("failed to clear role permissions"))?;

    for (position, permission_id) in permission_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id, position)
            VALUES ($1, $2, $3)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(to_db_id(*permission_id)?)
        .bind(to_db_position(position)?)
        .execute(&mut **transaction)
        .await
        .map_err(internal("failed to persist role permissions"))?;
    }

    Ok(())
}
