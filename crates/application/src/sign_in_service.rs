//! Credential sign-in and effective access resolution.

use std::sync::Arc;

use tracing::{info, warn};

use warden_core::{AppError, AppResult};
use warden_domain::{EffectiveAccess, Member, MemberId};

use crate::organization_ports::{MemberRepository, OrganizationRepository};
use crate::session_ports::IdentityProvider;
use crate::session_token_service::{SessionTokenService, SessionTokens};

/// Application service tying identity verification to token issuance.
#[derive(Clone)]
pub struct SignInService {
    identity_provider: Arc<dyn IdentityProvider>,
    members: Arc<dyn MemberRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    tokens: SessionTokenService,
}

impl SignInService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        members: Arc<dyn MemberRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        tokens: SessionTokenService,
    ) -> Self {
        Self {
            identity_provider,
            members,
            organizations,
            tokens,
        }
    }

    /// Verifies credentials and issues a token pair.
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<SessionTokens> {
        let Some(identity) = self
            .identity_provider
            .authenticate(username, password)
            .await?
        else {
            warn!(username, "sign-in rejected by identity provider");
            return Err(AppError::AuthenticationFailed);
        };

        let Some(member) = self
            .members
            .find_member_by_username(&identity.username)
            .await?
        else {
            warn!(
                username = identity.username,
                "sign-in for identity without member record"
            );
            return Err(AppError::AuthenticationFailed);
        };

        let tokens = self.issue_for(&member).await?;
        info!(member_id = %member.id(), "member signed in");
        Ok(tokens)
    }

    /// Issues a token pair for an already authenticated member.
    pub async fn issue_for_member(&self, member_id: MemberId) -> AppResult<SessionTokens> {
        let member = self.find_member(member_id).await?;
        self.issue_for(&member).await
    }

    /// Returns the roles and permissions `member_id` currently holds.
    pub async fn effective_access(&self, member_id: MemberId) -> AppResult<EffectiveAccess> {
        let member = self.find_member(member_id).await?;
        self.aggregate(&member).await
    }

    async fn find_member(&self, member_id: MemberId) -> AppResult<Member> {
        self.members
            .find_member(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' was not found")))
    }

    async fn issue_for(&self, member: &Member) -> AppResult<SessionTokens> {
        member.ensure_approved()?;

        let access = self.aggregate(member).await?;
        self.tokens
            .issue(member.id(), access.roles, access.permissions)
    }

    async fn aggregate(&self, member: &Member) -> AppResult<EffectiveAccess> {
        let organizations = self
            .organizations
            .list_organizations_for_member(member.id())
            .await?;
        Ok(EffectiveAccess::aggregate(member, &organizations))
    }
}

#[cfg(test)]
mod tests;
