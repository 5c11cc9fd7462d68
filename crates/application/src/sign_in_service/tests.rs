use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use warden_core::{ActorIdentity, AppError, AppResult};
use warden_domain::{
    AuditStamp, EntryKind, Member, MemberId, Organization, OrganizationId, Permission,
    PermissionId, Role, RoleId, SessionClaims,
};

use crate::organization_ports::{MemberRepository, NewOrganization, OrganizationRepository};
use crate::session_ports::{ExternalIdentity, IdentityProvider, SessionTokenCodec};
use crate::session_token_service::{SessionTokenService, SessionTokenSettings};

use super::SignInService;

struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<ExternalIdentity>> {
        if password != "correct-horse" {
            return Ok(None);
        }

        Ok(Some(ExternalIdentity {
            username: username.to_owned(),
            display_name: None,
        }))
    }
}

struct FakeMembers {
    members: Vec<Member>,
}

#[async_trait]
impl MemberRepository for FakeMembers {
    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<Member>> {
        Ok(self
            .members
            .iter()
            .find(|member| member.id() == member_id)
            .cloned())
    }

    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        Ok(self
            .members
            .iter()
            .find(|member| member.username() == username)
            .cloned())
    }

    async fn existing_member_ids(&self, member_ids: &[MemberId]) -> AppResult<Vec<MemberId>> {
        Ok(member_ids.to_vec())
    }
}

struct FakeOrganizations {
    organizations: Vec<Organization>,
}

#[async_trait]
impl OrganizationRepository for FakeOrganizations {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        Ok(self.organizations.clone())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        Ok(self
            .organizations
            .iter()
            .find(|organization| organization.id() == organization_id)
            .cloned())
    }

    async fn list_organizations_for_member(
        &self,
        member_id: MemberId,
    ) -> AppResult<Vec<Organization>> {
        Ok(self
            .organizations
            .iter()
            .filter(|organization| organization.has_member(member_id))
            .cloned()
            .collect())
    }

    async fn create_organization(&self, _input: NewOrganization) -> AppResult<Organization> {
        Err(AppError::Internal("not supported by fake".to_owned()))
    }

    async fn update_organizations(&self, _organizations: &[Organization]) -> AppResult<()> {
        Ok(())
    }

    async fn save_role_assignments(&self, _organization: &Organization) -> AppResult<()> {
        Ok(())
    }

    async fn save_member_assignments(&self, _organization: &Organization) -> AppResult<()> {
        Ok(())
    }

    async fn delete_organizations(&self, _ids: &[OrganizationId]) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingCodec {
    issued: Mutex<HashMap<String, SessionClaims>>,
}

impl RecordingCodec {
    fn claims(&self, token: &str) -> SessionClaims {
        self.issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned()
            .unwrap_or_else(|| unreachable!())
    }
}

impl SessionTokenCodec for RecordingCodec {
    fn encode(&self, claims: &SessionClaims) -> AppResult<String> {
        let mut issued = self
            .issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let token = format!("token-{}", issued.len() + 1);
        issued.insert(token.clone(), claims.clone());
        Ok(token)
    }

    fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        self.issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

fn stamp() -> AuditStamp {
    AuditStamp::created(&ActorIdentity::system(), Utc::now())
}

fn permission(id: u64, name: &str) -> Permission {
    Permission::new(
        PermissionId::new(id),
        EntryKind::UserDefined,
        name,
        None,
        stamp(),
    )
    .unwrap_or_else(|_| unreachable!())
}

fn role(id: u64, name: &str, permissions: Vec<Permission>) -> Role {
    Role::new(
        RoleId::new(id),
        EntryKind::UserDefined,
        name,
        None,
        permissions,
        stamp(),
    )
    .unwrap_or_else(|_| unreachable!())
}

fn build_service() -> (SignInService, Arc<RecordingCodec>) {
    let p1 = permission(1, "P1");
    let p2 = permission(2, "P2");
    let p3 = permission(3, "P3");
    let manager = role(1, "MGR", vec![p1, p2.clone()]);
    let admin = role(2, "ADMIN", vec![p2, p3]);

    let approved = Member::new(MemberId::new(1), "ann", true, vec![manager])
        .unwrap_or_else(|_| unreachable!());
    let pending = Member::new(MemberId::new(2), "ben", false, Vec::new())
        .unwrap_or_else(|_| unreachable!());

    let organization = Organization::new(OrganizationId::new(1), "Ops", None, 0, stamp())
        .unwrap_or_else(|_| unreachable!())
        .with_roles(vec![admin])
        .with_members(vec![MemberId::new(1)]);

    let codec = Arc::new(RecordingCodec::default());
    let tokens = SessionTokenService::new(codec.clone(), SessionTokenSettings::default());

    let service = SignInService::new(
        Arc::new(FakeIdentityProvider),
        Arc::new(FakeMembers {
            members: vec![approved, pending],
        }),
        Arc::new(FakeOrganizations {
            organizations: vec![organization],
        }),
        tokens,
    );
    (service, codec)
}

#[tokio::test]
async fn sign_in_aggregates_direct_and_organization_roles() {
    let (service, codec) = build_service();

    let tokens = service
        .sign_in("ann", "correct-horse")
        .await
        .unwrap_or_else(|_| unreachable!());

    let claims = codec.claims(&tokens.access_token);
    assert_eq!(claims.member_id(), MemberId::new(1));
    assert_eq!(claims.roles(), ["MGR".to_owned(), "ADMIN".to_owned()]);
    assert_eq!(
        claims.permissions(),
        ["P1".to_owned(), "P2".to_owned(), "P3".to_owned()]
    );
}

#[tokio::test]
async fn sign_in_failure_kinds() {
    let (service, _) = build_service();

    let wrong_password = service.sign_in("ann", "nope").await;
    assert!(matches!(
        wrong_password,
        Err(AppError::AuthenticationFailed)
    ));

    let unknown_member = service.sign_in("zoe", "correct-horse").await;
    assert!(matches!(
        unknown_member,
        Err(AppError::AuthenticationFailed)
    ));

    let unapproved = service.sign_in("ben", "correct-horse").await;
    assert!(matches!(unapproved, Err(AppError::Unapproved(_))));
}

#[tokio::test]
async fn issue_for_member_requires_known_member() {
    let (service, _) = build_service();

    let tokens = service.issue_for_member(MemberId::new(1)).await;
    assert!(tokens.is_ok());

    let missing = service.issue_for_member(MemberId::new(9)).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn effective_access_for_member_without_organizations() {
    let (service, _) = build_service();

    let access = service
        .effective_access(MemberId::new(2))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(access.roles.is_empty());
    assert!(access.permissions.is_empty());
}
