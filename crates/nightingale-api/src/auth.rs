//! Bearer-token verification.
//!
//! Tokens are issued by the identity collaborator; this crate only
//! verifies them against the shared secret.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nightingale_core::config::AuthConfig;
use nightingale_core::error::AppError;
use nightingale_core::result::AppResult;

/// Claims carried by portal access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: Uuid,
    /// Username, for log context.
    pub username: String,
    /// Role name (admin/faculty/student).
    pub role: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Verify a bearer token and return its claims.
pub fn verify_token(token: &str, config: &AuthConfig) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.expiry_leeway_seconds;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::unauthorized(format!("Invalid token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            expiry_leeway_seconds: 0,
        }
    }

    fn issue(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            username: "mthomas".into(),
            role: "faculty".into(),
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn test_valid_token_round_trips() {
        let original = claims(3600);
        let token = issue(&original, "test-secret");
        let verified = verify_token(&token, &config()).unwrap();
        assert_eq!(verified.sub, original.sub);
        assert_eq!(verified.role, "faculty");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(&claims(3600), "other-secret");
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue(&claims(-3600), "test-secret");
        assert!(verify_token(&token, &config()).is_err());
    }
}
