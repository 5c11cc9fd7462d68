use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use warden_application::SessionTokenCodec;
use warden_core::{AppError, AppResult};
use warden_domain::SessionClaims;

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// HMAC-SHA256 session token codec backed by one process-wide secret.
#[derive(Clone)]
pub struct Hs256SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256SessionTokenCodec {
    /// Creates a codec from a shared secret.
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "session token secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Non-expiring tokens carry no `exp`; expiry is still checked when present.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl std::fmt::Debug for Hs256SessionTokenCodec {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Hs256SessionTokenCodec")
            .finish_non_exhaustive()
    }
}

impl SessionTokenCodec for Hs256SessionTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> AppResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign session token: {error}")))
    }

    fn decode(&self, token: &str) -> AppResult<SessionClaims> {
        let claims = jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map(|data| data.claims)
        .map_err(|error| {
            debug!(error = %error, "session token rejected");
            match error.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        if claims.is_expired_at(Utc::now()) {
            return Err(AppError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::json;

    use warden_application::SessionTokenCodec;
    use warden_core::AppError;
    use warden_domain::{MemberId, SessionClaims};

    use super::Hs256SessionTokenCodec;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn codec() -> Hs256SessionTokenCodec {
        Hs256SessionTokenCodec::new(SECRET).unwrap_or_else(|_| unreachable!())
    }

    fn claims(expires_in: Option<Duration>) -> SessionClaims {
        let now = Utc::now();
        SessionClaims::new(
            MemberId::new(7),
            vec!["MGR".to_owned()],
            vec!["P1".to_owned(), "P2".to_owned()],
            now,
            expires_in.map(|ttl| now + ttl),
        )
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = Hs256SessionTokenCodec::new("too-short");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn roundtrip_keeps_claims() {
        let codec = codec();
        let original = claims(Some(Duration::minutes(15)));

        let token = codec.encode(&original).unwrap_or_else(|_| unreachable!());
        let decoded = codec.decode(&token).unwrap_or_else(|_| unreachable!());

        assert_eq!(decoded, original);
    }

    #[test]
    fn non_expiring_token_decodes_without_exp() {
        let codec = codec();
        let original = claims(None);

        let token = codec.encode(&original).unwrap_or_else(|_| unreachable!());
        let decoded = codec.decode(&token).unwrap_or_else(|_| unreachable!());

        assert_eq!(decoded.expires_at(), None);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let codec = codec();
        let now = Utc::now();
        let expired = SessionClaims::new(
            MemberId::new(7),
            Vec::new(),
            Vec::new(),
            now - Duration::hours(1),
            Some(now - Duration::seconds(5)),
        );

        let token = codec.encode(&expired).unwrap_or_else(|_| unreachable!());

        assert!(matches!(codec.decode(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let codec = codec();
        let token = codec
            .encode(&claims(Some(Duration::minutes(15))))
            .unwrap_or_else(|_| unreachable!());

        let position = token.find('.').unwrap_or_else(|| unreachable!()) + 5;
        let replacement = if &token[position..=position] == "A" { "B" } else { "A" };
        let mut tampered = token.clone();
        tampered.replace_range(position..=position, replacement);

        assert!(matches!(codec.decode(&tampered), Err(AppError::InvalidToken)));
        assert!(matches!(codec.decode("not-a-token"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn other_secret_is_invalid() {
        let token = Hs256SessionTokenCodec::new("ffffffffffffffffffffffffffffffff")
            .unwrap_or_else(|_| unreachable!())
            .encode(&claims(Some(Duration::minutes(15))))
            .unwrap_or_else(|_| unreachable!());

        assert!(matches!(codec().decode(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn other_algorithm_is_invalid() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims(Some(Duration::minutes(15))),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap_or_else(|_| unreachable!());

        assert!(matches!(codec().decode(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn unknown_claims_are_invalid() {
        let payload = json!({
            "id": 7,
            "roles": [],
            "permissions": ["P1"],
            "iat": Utc::now().timestamp(),
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
            "admin": true,
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap_or_else(|_| unreachable!());

        assert!(matches!(codec().decode(&token), Err(AppError::InvalidToken)));
    }
}
