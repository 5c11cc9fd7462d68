//! Application services and ports.

#![forbid(unsafe_code)]

mod organization_ports;
mod organization_service;
mod registry_ports;
mod role_access_service;
mod session_ports;
mod session_token_service;
mod sign_in_service;

pub use organization_ports::{MemberRepository, NewOrganization, OrganizationRepository};
pub use organization_service::OrganizationService;
pub use registry_ports::{
    AccessRegistryRepository, NewPermission, NewRole, PermissionInput, RoleInput,
};
pub use role_access_service::{PredefinedCatalog, PredefinedRole, RoleAccessService, SeedSummary};
pub use session_ports::{
    CredentialRepository, ExternalIdentity, IdentityProvider, SessionTokenCodec,
};
pub use session_token_service::{SessionTokenService, SessionTokenSettings, SessionTokens};
pub use sign_in_service::SignInService;
