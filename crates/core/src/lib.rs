//! Shared primitives for all Rust crates in Warden.

#![forbid(unsafe_code)]

/// Caller identity primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::ActorIdentity;

/// Result type used across Warden crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    ///
    /// Surrounding whitespace is trimmed before validation and storage.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
///
/// Callers branch on the variant, never on the message text.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A permission with the same name already exists.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// Mutation attempted on a predefined permission or role.
    #[error("non-changeable: {0}")]
    NonChangeable(String),

    /// Credentials did not match any known principal.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Principal exists but has not been approved for access yet.
    #[error("unapproved: {0}")]
    Unapproved(String),

    /// Token signature is valid but its expiry instant has passed.
    #[error("token expired")]
    TokenExpired,

    /// Token is malformed, tampered with, or signed with another algorithm.
    #[error("invalid token")]
    InvalidToken,

    /// Organization move would make a node its own ancestor.
    #[error("cycle detected: {0}")]
    CycleDetected(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Principal is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn non_empty_string_trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  Finance ");
        assert_eq!(
            value.map(String::from).unwrap_or_default(),
            "Finance".to_owned()
        );
    }

    #[test]
    fn token_errors_render_without_detail() {
        assert_eq!(AppError::TokenExpired.to_string(), "token expired");
        assert_eq!(AppError::InvalidToken.to_string(), "invalid token");
    }
}
