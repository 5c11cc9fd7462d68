//! Local password identity provider backed by Argon2id hashes.
//!
//! Parameters follow OWASP password storage guidance: m=19456 (19 MiB), t=2, p=1.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;

use warden_application::{CredentialRepository, ExternalIdentity, IdentityProvider};
use warden_core::{AppError, AppResult};

/// Argon2id hashing and verification of member passwords.
#[derive(Clone)]
pub(crate) struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a new Argon2id hasher with recommended parameters.
    #[must_use]
    pub(crate) fn new() -> Self {
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes a password into PHC string format with a random salt.
    pub(crate) fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))?;

        Ok(hash.to_string())
    }

    /// Returns whether `password` matches the stored PHC `hash`.
    pub(crate) fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("failed to parse password hash: {error}"))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

/// Identity provider that checks passwords against locally stored hashes.
#[derive(Clone)]
pub struct PasswordIdentityProvider {
    credentials: Arc<dyn CredentialRepository>,
    hasher: Argon2PasswordHasher,
}

impl PasswordIdentityProvider {
    /// Creates a provider reading hashes from `credentials`.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self {
            credentials,
            hasher: Argon2PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for PasswordIdentityProvider {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<ExternalIdentity>> {
        let Some(hash) = self.credentials.find_password_hash(username).await? else {
            return Ok(None);
        };

        if !self.hasher.verify_password(password, &hash)? {
            return Ok(None);
        }

        Ok(Some(ExternalIdentity {
            username: username.to_owned(),
            display_name: None,
        }))
    }
}

/// Identity provider that rejects every credential.
///
/// Used when interactive sign-in is turned off and only service tokens are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn authenticate(
        &self,
        _username: &str,
        _password: &str,
    ) -> AppResult<Option<ExternalIdentity>> {
        Ok(None)
    }
}
