//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod effective_access;
mod hierarchy;
mod ids;
mod member;
mod organization;
mod security;
mod session;

pub use access::{EntryKind, Permission, Role};
pub use audit::AuditStamp;
pub use effective_access::EffectiveAccess;
pub use hierarchy::OrganizationTree;
pub use ids::{MemberId, OrganizationId, PermissionId, RoleId};
pub use member::Member;
pub use organization::Organization;
pub use security::{ADMINISTRATOR_ROLE, SystemPermission};
pub use session::{ANY_AUTHENTICATED, AccessRequirement, SessionClaims};
