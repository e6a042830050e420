//! Authenticated-caller extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use nightingale_core::error::AppError;
use nightingale_core::result::AppResult;
use nightingale_entity::user::UserRole;
use nightingale_service::context::RequestContext;

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::state::SharedState;

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Caller's identity.
    pub user_id: Uuid,
    /// Caller's role.
    pub role: UserRole,
    /// Username, for log context.
    pub username: String,
}

impl AuthUser {
    /// Request context for the service layer.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.user_id, self.role)
    }

    /// Reject callers without the admin role.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin role required"))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

        let claims = verify_token(&token, &state.config.auth)?;
        let role: UserRole = claims.role.parse()?;

        Ok(Self {
            user_id: claims.sub,
            role,
            username: claims.username,
        })
    }
}

/// Bearer token from the `Authorization` header, with a `token` query
/// parameter fallback for the WebSocket upgrade.
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }
    parts
        .uri
        .query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_header_token_preferred() {
        let p = parts("/api/notifications?token=from-query", Some("Bearer abc"));
        assert_eq!(bearer_token(&p).as_deref(), Some("abc"));
    }

    #[test]
    fn test_query_token_fallback() {
        let p = parts("/ws?token=xyz&foo=1", None);
        assert_eq!(bearer_token(&p).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_token() {
        let p = parts("/api/notifications", None);
        assert!(bearer_token(&p).is_none());
    }

    #[test]
    fn test_admin_guard() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Student,
            username: "s".into(),
        };
        assert!(user.require_admin().is_err());
    }
}
