use warden_application::{
    OrganizationService, RoleAccessService, SessionTokenService, SignInService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_access_service: RoleAccessService,
    pub organization_service: OrganizationService,
    pub session_token_service: SessionTokenService,
    pub sign_in_service: SignInService,
}
