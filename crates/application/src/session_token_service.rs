//! Access and refresh token issuance.
//!
//! Tokens are stateless: nothing is stored server-side and there is no
//! revocation. Role and permission changes reach a member on the next
//! sign-in, never through `refresh`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use warden_core::{AppError, AppResult};
use warden_domain::{MemberId, SessionClaims};

use crate::session_ports::SessionTokenCodec;

/// Lifetimes applied to newly issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTokenSettings {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionTokenSettings {
    /// Creates settings with explicit lifetimes.
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> AppResult<Self> {
        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(AppError::Validation(
                "token lifetimes must be positive".to_owned(),
            ));
        }

        Ok(Self {
            access_ttl,
            refresh_ttl,
        })
    }

    /// Returns the access token lifetime.
    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Returns the refresh token lifetime.
    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl Default for SessionTokenSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        }
    }
}

/// Token pair returned after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Short-lived token presented on every request.
    pub access_token: String,
    /// Long-lived token exchanged for new access tokens.
    pub refresh_token: String,
}

/// Application service that signs, verifies and refreshes session tokens.
#[derive(Clone)]
pub struct SessionTokenService {
    codec: Arc<dyn SessionTokenCodec>,
    settings: SessionTokenSettings,
}

impl SessionTokenService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(codec: Arc<dyn SessionTokenCodec>, settings: SessionTokenSettings) -> Self {
        Self { codec, settings }
    }

    /// Returns the configured lifetimes.
    #[must_use]
    pub fn settings(&self) -> SessionTokenSettings {
        self.settings
    }

    /// Issues an access and a refresh token carrying identical claims.
    pub fn issue(
        &self,
        member_id: MemberId,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> AppResult<SessionTokens> {
        self.issue_at(member_id, roles, permissions, Utc::now())
    }

    /// Issues a token pair as of `issued_at`.
    pub fn issue_at(
        &self,
        member_id: MemberId,
        roles: Vec<String>,
        permissions: Vec<String>,
        issued_at: DateTime<Utc>,
    ) -> AppResult<SessionTokens> {
        let access = SessionClaims::new(
            member_id,
            roles,
            permissions,
            issued_at,
            Some(issued_at + self.settings.access_ttl),
        );
        let refresh = access.reissued(issued_at, Some(issued_at + self.settings.refresh_ttl));

        let tokens = SessionTokens {
            access_token: self.codec.encode(&access)?,
            refresh_token: self.codec.encode(&refresh)?,
        };

        info!(
            member_id = %member_id,
            roles = access.roles().len(),
            permissions = access.permissions().len(),
            "session tokens issued"
        );
        Ok(tokens)
    }

    /// Issues a token without expiry and without roles.
    ///
    /// Intended for service-to-service callers; keep `permissions` narrow.
    pub fn issue_non_expiring(
        &self,
        member_id: MemberId,
        permissions: Vec<String>,
    ) -> AppResult<String> {
        let claims = SessionClaims::new(member_id, Vec::new(), permissions, Utc::now(), None);
        let token = self.codec.encode(&claims)?;

        info!(
            member_id = %member_id,
            permissions = claims.permissions().len(),
            "non-expiring token issued"
        );
        Ok(token)
    }

    /// Verifies a token and returns its claims.
    pub fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        self.codec.decode(token)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The embedded claims are copied as-is; no re-aggregation happens.
    pub fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        self.refresh_at(refresh_token, Utc::now())
    }

    /// Exchanges a refresh token as of `now`.
    pub fn refresh_at(&self, refresh_token: &str, now: DateTime<Utc>) -> AppResult<String> {
        let claims = self.codec.decode(refresh_token)?;
        let access = claims.reissued(now, Some(now + self.settings.access_ttl));

        debug!(member_id = %access.member_id(), "access token refreshed");
        self.codec.encode(&access)
    }
}
