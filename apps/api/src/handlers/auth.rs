use axum::Json;
use axum::extract::{Extension, State};
use warden_domain::SessionClaims;

use crate::dto::{
    IssuedTokenResponse, RefreshTokenRequest, SessionResponse, SessionTokensResponse,
    SignInRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Verifies credentials and issues an access and refresh token pair.
pub async fn sign_in_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<Json<SessionTokensResponse>> {
    let tokens = state
        .sign_in_service
        .sign_in(payload.username.as_str(), payload.password.as_str())
        .await?;

    Ok(Json(SessionTokensResponse::from(tokens)))
}

/// Exchanges a refresh token for a new access token with the same claims.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<Json<IssuedTokenResponse>> {
    let access_token = state
        .session_token_service
        .refresh(payload.refresh_token.as_str())?;

    Ok(Json(IssuedTokenResponse::bearer(access_token)))
}

/// Returns the decoded claims of the calling token.
///
/// The session middleware has already verified the token, so any caller
/// reaching this handler is authenticated.
pub async fn session_handler(
    Extension(claims): Extension<SessionClaims>,
) -> Json<SessionResponse> {
    Json(SessionResponse::from(claims))
}
