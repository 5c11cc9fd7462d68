use serde::Serialize;

mod auth;
mod organizations;
mod registry;

pub use auth::{
    IssuedTokenResponse, RefreshTokenRequest, SessionResponse, SessionTokensResponse,
    SignInRequest,
};
pub use organizations::{
    AssignMembersRequest, AssignRolesRequest, CreateOrganizationRequest, MoveOrganizationRequest,
    OrganizationResponse, RenameOrganizationRequest, ResequenceSiblingsRequest,
};
pub use registry::{PermissionRequest, PermissionResponse, RoleRequest, RoleResponse};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
