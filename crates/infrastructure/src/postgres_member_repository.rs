use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::{CredentialRepository, MemberRepository};
use warden_core::AppResult;
use warden_domain::{Member, MemberId, RoleId};

use crate::postgres_rows::{from_db_id, in_requested_order, internal, load_roles, to_db_id, to_db_ids};

/// PostgreSQL-backed read repository for members and their password hashes.
#[derive(Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, row: MemberRow) -> AppResult<Member> {
        let role_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT role_id
            FROM member_roles
            WHERE member_id = $1
            ORDER BY position
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("failed to load member roles"))?;

        let requested: Vec<RoleId> = role_ids
            .iter()
            .map(|role_id| from_db_id(*role_id).map(RoleId::new))
            .collect::<AppResult<_>>()?;
        let roles = in_requested_order(load_roles(&self.pool, Some(&role_ids)).await?, &requested);

        Member::new(
            MemberId::new(from_db_id(row.id)?),
            row.username,
            row.approved,
            roles,
        )
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    id: i64,
    username: String,
    approved: bool,
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT id, username, approved FROM members WHERE id = $1",
        )
        .bind(to_db_id(member_id.get())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("failed to find member"))?;

        match row {
            Some(row) => self.with_roles(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT id, username, approved FROM members WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("failed to find member by username"))?;

        match row {
            Some(row) => self.with_roles(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn existing_member_ids(&self, member_ids: &[MemberId]) -> AppResult<Vec<MemberId>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = to_db_ids(member_ids.iter().map(|member_id| member_id.get()))?;
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM members WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(internal("failed to resolve members"))?;

        Ok(member_ids
            .iter()
            .zip(ids)
            .filter(|(_, id)| existing.contains(id))
            .map(|(member_id, _)| *member_id)
            .collect())
    }
}

#[async_trait]
impl CredentialRepository for PostgresMemberRepository {
    async fn find_password_hash(&self, username: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM members WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map(Option::flatten)
        .map_err(internal("failed to load member credentials"))
    }
}
