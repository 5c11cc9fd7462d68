use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use warden_core::{ActorIdentity, AppError};
use warden_domain::{AccessRequirement, SessionClaims, SystemPermission};

use crate::error::ApiResult;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Verifies the bearer token and stores its claims in request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())?;
    let claims = state.session_token_service.decode(token)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Rejects callers holding none of `permissions`.
pub fn require(claims: &SessionClaims, permissions: &[SystemPermission]) -> ApiResult<()> {
    AccessRequirement::system(permissions).check(claims)?;
    Ok(())
}

/// Audit identity for mutations made with a session token.
pub fn actor(claims: &SessionClaims) -> ActorIdentity {
    let member_id = claims.member_id();
    ActorIdentity::new(member_id.to_string(), format!("member {member_id}"))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::InvalidToken)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;

    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};
    use chrono::Utc;
    use warden_core::AppError;
    use warden_domain::{MemberId, SessionClaims, SystemPermission};

    use super::{actor, bearer_token, require};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).ok(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_foreign_schemes_are_invalid() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AppError::InvalidToken)));
        assert!(matches!(bearer_token(&headers("Basic Zm9v")), Err(AppError::InvalidToken)));
        assert!(matches!(bearer_token(&headers("Bearer ")), Err(AppError::InvalidToken)));
    }

    #[test]
    fn require_checks_system_permissions() {
        let claims = SessionClaims::new(
            MemberId::new(5),
            Vec::new(),
            vec!["registry.read".to_owned()],
            Utc::now(),
            None,
        );

        assert!(require(&claims, &[SystemPermission::RegistryRead]).is_ok());
        assert!(require(&claims, &[SystemPermission::RegistryManage]).is_err());
        assert_eq!(actor(&claims).subject(), "5");
    }
}
