use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::{MemberId, Role};

/// Authenticated principal as seen by the authorization core.
///
/// Members are owned by the identity subsystem; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    username: NonEmptyString,
    approved: bool,
    roles: Vec<Role>,
}

impl Member {
    /// Creates a member projection with its directly assigned roles.
    pub fn new(
        id: MemberId,
        username: impl Into<String>,
        approved: bool,
        roles: Vec<Role>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            username: NonEmptyString::new(username)?,
            approved,
            roles,
        })
    }

    /// Returns the member identifier.
    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns whether an administrator approved the member.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approved
    }

    /// Returns directly assigned roles in stored order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Fails with `Unapproved` when the member may not sign in yet.
    pub fn ensure_approved(&self) -> AppResult<()> {
        if !self.approved {
            return Err(AppError::Unapproved(format!(
                "member '{}' is awaiting approval",
                self.username
            )));
        }

        Ok(())
    }
}
