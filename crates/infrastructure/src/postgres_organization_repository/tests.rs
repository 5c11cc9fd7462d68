use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use warden_application::{MemberRepository, NewOrganization, OrganizationRepository};
use warden_core::{ActorIdentity, AppError, NonEmptyString};
use warden_domain::{AuditStamp, MemberId, Organization, OrganizationId};

use super::PostgresOrganizationRepository;
use crate::PostgresMemberRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres organization tests: {error}");
    }

    Some(pool)
}

async fn create(
    repository: &PostgresOrganizationRepository,
    parent_id: Option<OrganizationId>,
    name: &str,
) -> Organization {
    repository
        .create_organization(NewOrganization {
            name: NonEmptyString::new(name).unwrap_or_else(|_| unreachable!()),
            parent_id,
            sequence: 0,
            audit: AuditStamp::created(&ActorIdentity::system(), Utc::now()),
        })
        .await
        .unwrap_or_else(|_| unreachable!())
}

async fn insert_member(pool: &PgPool, username: &str) -> MemberId {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO members (username, approved)
        VALUES ($1, true)
        RETURNING id
        "#,
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|_| unreachable!());

    MemberId::new(u64::try_from(id).unwrap_or_else(|_| unreachable!()))
}

fn unique(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

#[tokio::test]
async fn delete_organizations_is_atomic() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresOrganizationRepository::new(pool);

    let root = create(&repository, None, "Root").await;
    let child = create(&repository, Some(root.id()), "Child").await;

    // Deleting the parent first violates the parent reference and rolls back.
    let wrong_order = repository
        .delete_organizations(&[root.id(), child.id()])
        .await;
    assert!(matches!(wrong_order, Err(AppError::Internal(_))));

    let still_there = repository
        .find_organization(child.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(still_there.is_some());

    let leaves_first = repository
        .delete_organizations(&[child.id(), root.id()])
        .await;
    assert!(leaves_first.is_ok());

    let gone = repository
        .find_organization(root.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(gone.is_none());
}

#[tokio::test]
async fn member_assignments_keep_order_and_drive_member_lookup() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresOrganizationRepository::new(pool.clone());
    let members = PostgresMemberRepository::new(pool.clone());

    let first = insert_member(&pool, &unique("first")).await;
    let second = insert_member(&pool, &unique("second")).await;

    let mut organization = create(&repository, None, "Members").await;
    organization.assign_members(
        &ActorIdentity::new("alice", "Alice"),
        vec![second, first],
        Utc::now(),
    );
    assert!(repository.save_member_assignments(&organization).await.is_ok());

    let reloaded = repository
        .find_organization(organization.id())
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert_eq!(reloaded.member_ids(), &[second, first]);
    assert_eq!(reloaded.audit().updated_by(), "alice");

    let for_member = repository
        .list_organizations_for_member(first)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(
        for_member
            .iter()
            .any(|candidate| candidate.id() == organization.id())
    );

    let existing = members
        .existing_member_ids(&[MemberId::new(i64::MAX as u64), first])
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(existing, vec![first]);
}

#[tokio::test]
async fn update_organizations_persists_parent_and_sequence() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresOrganizationRepository::new(pool);

    let left = create(&repository, None, "Left").await;
    let right = create(&repository, None, "Right").await;
    let mut child = create(&repository, Some(left.id()), "Child").await;

    child.reparent(&ActorIdentity::system(), Some(right.id()), 3, Utc::now());
    assert!(
        repository
            .update_organizations(std::slice::from_ref(&child))
            .await
            .is_ok()
    );

    let reloaded = repository
        .find_organization(child.id())
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| unreachable!());
    assert_eq!(reloaded.parent_id(), Some(right.id()));
    assert_eq!(reloaded.sequence(), 3);
}
