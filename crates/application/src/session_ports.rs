use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::SessionClaims;

/// Port for signing and verifying session tokens.
///
/// Implementations must reject tokens signed with any algorithm other than
/// the configured one and report expiry as `AppError::TokenExpired`.
pub trait SessionTokenCodec: Send + Sync {
    /// Serializes and signs claims into a compact token.
    fn encode(&self, claims: &SessionClaims) -> AppResult<String>;

    /// Verifies a compact token and returns its claims.
    fn decode(&self, token: &str) -> AppResult<SessionClaims>;
}

/// Identity returned by an external identity provider after a credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Login name used to look up the member.
    pub username: String,
    /// Display name reported by the provider, when available.
    pub display_name: Option<String>,
}

/// Port for third-party credential verification (directory bind, OAuth, ...).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the identity on success, `None` on credential mismatch.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<ExternalIdentity>>;
}

/// Port for stored password credentials keyed by member username.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Returns the encoded password hash, `None` when the member has no password.
    async fn find_password_hash(&self, username: &str) -> AppResult<Option<String>>;
}
