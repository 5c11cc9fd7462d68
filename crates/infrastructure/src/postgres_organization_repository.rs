use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;

use warden_application::{NewOrganization, OrganizationRepository};
use warden_core::{AppError, AppResult};
use warden_domain::{AuditStamp, MemberId, Organization, OrganizationId, Role};

use crate::postgres_rows::{
    from_db_id, from_db_sequence, internal, load_roles, to_db_id, to_db_position,
    to_db_sequence,
};

/// PostgreSQL-backed repository for the organization tree.
#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
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

    async fn assemble(&self, rows: Vec<OrganizationRow>) -> AppResult<Vec<Organization>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let organization_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let role_links = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT organization_id AS owner_id, role_id AS target_id
            FROM organization_roles
            WHERE organization_id = ANY($1)
            ORDER BY organization_id, position
            "#,
        )
        .bind(&organization_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to load organization roles"))?;

        let member_links = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT organization_id AS owner_id, member_id AS target_id
            FROM organization_members
            WHERE organization_id = ANY($1)
            ORDER BY organization_id, position
            "#,
        )
        .bind(&organization_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to load organization members"))?;

        let role_ids: Vec<i64> = role_links
            .iter()
            .map(|link| link.target_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let roles: HashMap<i64, Role> = load_roles(&self.pool, Some(&role_ids))
            .await?
            .into_iter()
            .map(|role| to_db_id(role.id().get()).map(|id| (id, role)))
            .collect::<AppResult<_>>()?;

        let mut roles_by_organization: HashMap<i64, Vec<Role>> = HashMap::new();
        for link in role_links {
            if let Some(role) = roles.get(&link.target_id) {
                roles_by_organization
                    .entry(link.owner_id)
                    .or_default()
                    .push(role.clone());
            }
        }

        let mut members_by_organization: HashMap<i64, Vec<MemberId>> = HashMap::new();
        for link in member_links {
            members_by_organization
                .entry(link.owner_id)
                .or_default()
                .push(MemberId::new(from_db_id(link.target_id)?));
        }

        rows.into_iter()
            .map(|row| {
                let roles = roles_by_organization.remove(&row.id).unwrap_or_default();
                let members = members_by_organization.remove(&row.id).unwrap_or_default();
                row.into_organization()
                    .map(|organization| organization.with_roles(roles).with_members(members))
            })
            .collect()
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: i64,
    name: String,
    parent_id: Option<i64>,
    sequence: i32,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self) -> AppResult<Organization> {
        Organization::new(
            OrganizationId::new(from_db_id(self.id)?),
            self.name,
            self.parent_id
                .map(|parent_id| from_db_id(parent_id).map(OrganizationId::new))
                .transpose()?,
            from_db_sequence(self.sequence)?,
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
struct LinkRow {
    owner_id: i64,
    target_id: i64,
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        let rows = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, parent_id, sequence, created_by, updated_by, created_at, updated_at
            FROM organizations
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to list organizations"))?;

        self.assemble(rows).await
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, parent_id, sequence, created_by, updated_by, created_at, updated_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(to_db_id(organization_id.get())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("failed to find organization"))?;

        Ok(self
            .assemble(row.into_iter().collect())
            .await?
            .into_iter()
            .next())
    }

    async fn list_organizations_for_member(
        &self,
        member_id: MemberId,
    ) -> AppResult<Vec<Organization>> {
        let rows = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT
                organizations.id,
                organizations.name,
                organizations.parent_id,
                organizations.sequence,
                organizations.created_by,
                organizations.updated_by,
                organizations.created_at,
                organizations.updated_at
            FROM organizations
            INNER JOIN organization_members AS members
                ON members.organization_id = organizations.id
            WHERE members.member_id = $1
            ORDER BY organizations.id
            "#,
        )
        .bind(to_db_id(member_id.get())?)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to list organizations for member"))?;

        self.assemble(rows).await
    }

    async fn create_organization(&self, input: NewOrganization) -> AppResult<Organization> {
        let parent_id = input
            .parent_id
            .map(|parent_id| to_db_id(parent_id.get()))
            .transpose()?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO organizations
                (name, parent_id, sequence, created_by, updated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.name.as_str())
        .bind(parent_id)
        .bind(to_db_sequence(input.sequence)?)
        .bind(input.audit.created_by())
        .bind(input.audit.updated_by())
        .bind(input.audit.created_at())
        .bind(input.audit.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(internal("failed to create organization"))?;

        Organization::new(
            OrganizationId::new(from_db_id(id)?),
            input.name,
            input.parent_id,
            input.sequence,
            input.audit,
        )
    }

    async fn update_organizations(&self, organizations: &[Organization]) -> AppResult<()> {
        if organizations.is_empty() {
            return Ok(());
        }

        let mut transaction = self.begin().await?;

        for organization in organizations {
            let parent_id = organization
                .parent_id()
                .map(|parent_id| to_db_id(parent_id.get()))
                .transpose()?;

            let result = sqlx::query(
                r#"
                UPDATE organizations
                SET name = $2, parent_id = $3, sequence = $4, updated_by = $5, updated_at = $6
                WHERE id = $1
                "#,
            )
            .bind(to_db_id(organization.id().get())?)
            .bind(organization.name())
            .bind(parent_id)
            .bind(to_db_sequence(organization.sequence())?)
            .bind(organization.audit().updated_by())
            .bind(organization.audit().updated_at())
            .execute(&mut *transaction)
            .await
            .map_err(internal("failed to update organization"))?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "organization '{}' was not found",
                    organization.id()
                )));
            }
        }

        transaction
            .commit()
            .await
            .map_err(internal("failed to commit transaction"))
    }

    async fn save_role_assignments(&self, organization: &Organization) -> AppResult<()> {
        let targets: Vec<u64> = organization
            .roles()
            .iter()
            .map(|role| role.id().get())
            .collect();
        self.replace_links(organization, LinkTable::Roles, &targets)
            .await
    }

    async fn save_member_assignments(&self, organization: &Organization) -> AppResult<()> {
        let targets: Vec<u64> = organization
            .member_ids()
            .iter()
            .map(|member_id| member_id.get())
            .collect();
        self.replace_links(organization, LinkTable::Members, &targets)
            .await
    }

    async fn delete_organizations(&self, organization_ids: &[OrganizationId]) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        for organization_id in organization_ids {
            let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
                .bind(to_db_id(organization_id.get())?)
                .execute(&mut *transaction)
                .await
                .map_err(internal("failed to delete organization"))?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "organization '{organization_id}' was not found"
                )));
            }
        }

        transaction
            .commit()
            .await
            .map_err(internal("failed to commit transaction"))?;

        debug!(count = organization_ids.len(), "organization rows deleted");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum LinkTable {
    Roles,
    Members,
}

impl PostgresOrganizationRepository {
    async fn replace_links(
        &self,
        organization: &Organization,
        table: LinkTable,
        targets: &[u64],
    ) -> AppResult<()> {
        let (clear, insert) = match table {
            LinkTable::Roles => (
                "DELETE FROM organization_roles WHERE organization_id = $1",
                r#"
                INSERT INTO organization_roles (organization_id, role_id, position)
                VALUES ($1, $2, $3)
                "#,
            ),
            LinkTable::Members => (
                "DELETE FROM organization_members WHERE organization_id = $1",
                r#"
                INSERT INTO organization_members (organization_id, member_id, position)
                VALUES ($1, $2, $3)
                "#,
            ),
        };

        let organization_id = to_db_id(organization.id().get())?;
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET updated_by = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(organization_id)
        .bind(organization.audit().updated_by())
        .bind(organization.audit().updated_at())
        .execute(&mut *transaction)
        .await
        .map_err(internal("failed to stamp organization"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "organization '{}' was not found",
                organization.id()
            )));
        }

        sqlx::query(clear)
            .bind(organization_id)
            .execute(&mut *transaction)
            .await
            .map_err(internal("failed to clear organization assignments"))?;

        for (position, target) in targets.iter().enumerate() {
            sqlx::query(insert)
                .bind(organization_id)
                .bind(to_db_id(*target)?)
                .bind(to_db_position(position)?)
                .execute(&mut *transaction)
                .await
                .map_err(internal("failed to persist organization assignments"))?;
        }

        transaction
            .commit()
            .await
            .map_err(internal("failed to commit transaction"))
    }
}

#[cfg(test)]
mod tests;
