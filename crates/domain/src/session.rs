use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

use crate::{EffectiveAccess, MemberId, SystemPermission};

/// Wildcard entry meaning "any authenticated principal".
pub const ANY_AUTHENTICATED: &str = "*";

/// Claims carried inside access and refresh tokens.
///
/// Only these fields are accepted; tokens with any other claim are rejected
/// when decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    id: MemberId,
    roles: Vec<String>,
    permissions: Vec<String>,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

impl SessionClaims {
    /// Creates claims for `member_id` issued at `issued_at`.
    #[must_use]
    pub fn new(
        member_id: MemberId,
        roles: Vec<String>,
        permissions: Vec<String>,
        issued_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: member_id,
            roles,
            permissions,
            iat: issued_at.timestamp(),
            exp: expires_at.map(|value| value.timestamp()),
        }
    }

    /// Creates claims from an aggregation result.
    #[must_use]
    pub fn from_access(
        member_id: MemberId,
        access: EffectiveAccess,
        issued_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self::new(
            member_id,
            access.roles,
            access.permissions,
            issued_at,
            expires_at,
        )
    }

    /// Returns a copy re-issued at `issued_at` with a new expiry.
    #[must_use]
    pub fn reissued(&self, issued_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self::new(
            self.id,
            self.roles.clone(),
            self.permissions.clone(),
            issued_at,
            expires_at,
        )
    }

    /// Returns the member the token was issued to.
    #[must_use]
    pub fn member_id(&self) -> MemberId {
        self.id
    }

    /// Returns aggregated role names.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns aggregated permission names.
    #[must_use]
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Returns the issue instant in unix seconds.
    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Returns the expiry instant in unix seconds, `None` for non-expiring tokens.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.exp
    }

    /// Returns whether the expiry instant is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }
}

/// Permissions an endpoint requires from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    /// Any caller holding a valid token passes.
    AnyAuthenticated,
    /// The caller needs at least one of these permissions.
    AnyOf(Vec<String>),
}

impl AccessRequirement {
    /// Requirement satisfied by any verified token.
    #[must_use]
    pub fn any_authenticated() -> Self {
        Self::AnyAuthenticated
    }

    /// Builds a requirement satisfied by one of the given system permissions.
    #[must_use]
    pub fn system(permissions: &[SystemPermission]) -> Self {
        Self::AnyOf(
            permissions
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        )
    }

    /// Builds a requirement from declared permission names.
    ///
    /// A declared `"*"` turns the requirement into
    /// [`AccessRequirement::AnyAuthenticated`].
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.iter().any(|name| name == ANY_AUTHENTICATED) {
            return Self::AnyAuthenticated;
        }

        Self::AnyOf(names)
    }

    /// Checks decoded claims against the requirement.
    pub fn check(&self, claims: &SessionClaims) -> AppResult<()> {
        match self {
            Self::AnyAuthenticated => Ok(()),
            Self::AnyOf(required) => {
                let granted = claims
                    .permissions()
                    .iter()
                    .any(|permission| required.contains(permission));
                if granted {
                    Ok(())
                } else {
                    Err(AppError::Forbidden(format!(
                        "member '{}' holds none of [{}]",
                        claims.member_id(),
                        required.join(", ")
                    )))
                }
            }
        }
    }
}
