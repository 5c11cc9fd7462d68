use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::ActorIdentity;

/// Who created and last changed a record, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuditStamp {
    /// Creates a stamp for a record created now by `actor`.
    #[must_use]
    pub fn created(actor: &ActorIdentity, at: DateTime<Utc>) -> Self {
        Self {
            created_by: actor.subject().to_owned(),
            updated_by: actor.subject().to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Rebuilds a stamp from persisted columns.
    #[must_use]
    pub fn from_parts(
        created_by: impl Into<String>,
        updated_by: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            created_by: created_by.into(),
            updated_by: updated_by.into(),
            created_at,
            updated_at,
        }
    }

    /// Records a mutation performed by `actor`.
    pub fn touch(&mut self, actor: &ActorIdentity, at: DateTime<Utc>) {
        self.updated_by = actor.subject().to_owned();
        self.updated_at = at;
    }

    /// Returns the subject that created the record.
    #[must_use]
    pub fn created_by(&self) -> &str {
        self.created_by.as_str()
    }

    /// Returns the subject that last changed the record.
    #[must_use]
    pub fn updated_by(&self) -> &str {
        self.updated_by.as_str()
    }

    /// Returns the creation instant.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last mutation instant.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
