//! Row types and loaders shared by the PostgreSQL repositories.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use warden_core::{AppError, AppResult};
use warden_domain::{AuditStamp, EntryKind, Permission, PermissionId, Role, RoleId};

pub(crate) fn to_db_id(value: u64) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("identifier '{value}' is out of range")))
}

pub(crate) fn from_db_id(value: i64) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|_| AppError::Internal(format!("stored identifier '{value}' is negative")))
}

pub(crate) fn to_db_ids(values: impl IntoIterator<Item = u64>) -> AppResult<Vec<i64>> {
    values.into_iter().map(to_db_id).collect()
}

pub(crate) fn to_db_position(position: usize) -> AppResult<i32> {
    i32::try_from(position)
        .map_err(|_| AppError::Validation(format!("position '{position}' is out of range")))
}

pub(crate) fn to_db_sequence(sequence: u32) -> AppResult<i32> {
    i32::try_from(sequence)
        .map_err(|_| AppError::Validation(format!("sequence '{sequence}' is out of range")))
}

pub(crate) fn from_db_sequence(sequence: i32) -> AppResult<u32> {
    u32::try_from(sequence)
        .map_err(|_| AppError::Internal(format!("stored sequence '{sequence}' is negative")))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error)
            if database_error.code().as_deref() == Some("23505")
    )
}

pub(crate) fn internal(context: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| AppError::Internal(format!("{context}: {error}"))
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) id: i64,
    pub(crate) kind: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_by: String,
    pub(crate) updated_by: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl PermissionRow {
    pub(crate) fn into_permission(self) -> AppResult<Permission> {
        Permission::new(
            PermissionId::new(from_db_id(self.id)?),
            parse_kind(&self.kind)?,
            self.name,
            self.description,
            AuditStamp::from_parts(
                self.created_by,
                self.updated_by,
                self.created_at,
                self.updated_at,
            ),
        )
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    kind: String,
    name: String,
    description: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: i64,
    id: i64,
    kind: String,
    name: String,
    description: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Loads roles with their permissions in stored order.
///
/// `None` loads every role; otherwise only the listed ids. Results are ordered
/// by id.
pub(crate) async fn load_roles(pool: &PgPool, role_ids: Option<&[i64]>) -> AppResult<Vec<Role>> {
    let role_rows = match role_ids {
        None => {
            sqlx::query_as::<_, RoleRow>(
                r#"
                SELECT id, kind, name, description, created_by, updated_by, created_at, updated_at
                FROM roles
                ORDER BY id
                "#,
            )
            .fetch_all(pool)
            .await
        }
        Some(role_ids) => {
            sqlx::query_as::<_, RoleRow>(
                r#"
                SELECT id, kind, name, description, created_by, updated_by, created_at, updated_at
                FROM roles
                WHERE id = ANY($1)
                ORDER BY id
                "#,
            )
            .bind(role_ids)
            .fetch_all(pool)
            .await
        }
    }
    .map_err(internal("failed to load roles"))?;

    if role_rows.is_empty() {
        return Ok(Vec::new());
    }

    let loaded_ids: Vec<i64> = role_rows.iter().map(|row| row.id).collect();
    let permission_rows = sqlx::query_as::<_, RolePermissionRow>(
        r#"
        SELECT
            links.role_id,
            permissions.id,
            permissions.kind,
            permissions.name,
            permissions.description,
            permissions.created_by,
            permissions.updated_by,
            permissions.created_at,
            permissions.updated_at
        FROM role_permissions AS links
        INNER JOIN permissions
            ON permissions.id = links.permission_id
        WHERE links.role_id = ANY($1)
        ORDER BY links.role_id, links.position
        "#,
    )
    .bind(&loaded_ids)
    .fetch_all(pool)
    .await
    .map_err(internal("failed to load role permissions"))?;

    let mut permissions_by_role: HashMap<i64, Vec<Permission>> = HashMap::new();
    for row in permission_rows {
        let role_id = row.role_id;
        let permission = PermissionRow {
            id: row.id,
            kind: row.kind,
            name: row.name,
            description: row.description,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
        .into_permission()?;
        permissions_by_role
            .entry(role_id)
            .or_default()
            .push(permission);
    }

    role_rows
        .into_iter()
        .map(|row| {
            let permissions = permissions_by_role.remove(&row.id).unwrap_or_default();
            Role::new(
                RoleId::new(from_db_id(row.id)?),
                parse_kind(&row.kind)?,
                row.name,
                row.description,
                permissions,
                AuditStamp::from_parts(row.created_by, row.updated_by, row.created_at, row.updated_at),
            )
        })
        .collect()
}

/// Reorders `roles` to follow `requested`, skipping ids that were not loaded.
pub(crate) fn in_requested_order(roles: Vec<Role>, requested: &[RoleId]) -> Vec<Role> {
    let by_id: HashMap<RoleId, Role> = roles.into_iter().map(|role| (role.id(), role)).collect();
    requested
        .iter()
        .filter_map(|role_id| by_id.get(role_id).cloned())
        .collect()
}

fn parse_kind(value: &str) -> AppResult<EntryKind> {
    EntryKind::from_str(value)
        .map_err(|error| AppError::Internal(format!("invalid stored entry kind: {error}")))
}
