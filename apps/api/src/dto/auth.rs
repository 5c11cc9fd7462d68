use serde::{Deserialize, Serialize};
use warden_application::SessionTokens;
use warden_domain::{MemberId, SessionClaims};

/// Incoming credentials for sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Token pair issued on sign-in.
#[derive(Debug, Serialize)]
pub struct SessionTokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<SessionTokens> for SessionTokensResponse {
    fn from(value: SessionTokens) -> Self {
        Self {
            access_token: value.access_token,
            refresh_token: value.refresh_token,
            token_type: "Bearer",
        }
    }
}

/// Incoming payload for the refresh exchange.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct IssuedTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl IssuedTokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
        }
    }
}

/// Decoded claims of the calling token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub member_id: MemberId,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub issued_at: i64,
    pub expires_at: Option<i64>,
}

impl From<SessionClaims> for SessionResponse {
    fn from(value: SessionClaims) -> Self {
        Self {
            member_id: value.member_id(),
            roles: value.roles().to_vec(),
            permissions: value.permissions().to_vec(),
            issued_at: value.issued_at(),
            expires_at: value.expires_at(),
        }
    }
}
