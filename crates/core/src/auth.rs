use serde::{Deserialize, Serialize};

/// Identity of the caller performing an operation.
///
/// Passed explicitly into every mutating use-case so audit stamps never read
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    subject: String,
    display_name: String,
}

impl ActorIdentity {
    /// Creates an actor identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
        }
    }

    /// Identity used by bootstrap and seeding routines.
    #[must_use]
    pub fn system() -> Self {
        Self::new("system", "System")
    }

    /// Returns the stable subject recorded in audit stamps.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current caller.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}
