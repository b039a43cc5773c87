use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use fridgewise_auth::{Claims, verify_token};
use fridgewise_cache::CacheUser;
use fridgewise_config::JwtConfig;
use fridgewise_core::AppError;
use fridgewise_observability::track_jwt_validation;

use crate::state::AppState;

/// The authenticated caller's token claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Not authorized, no token")))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Not authorized, no token")))
}

fn authenticate(headers: &HeaderMap, jwt_config: &JwtConfig) -> Result<AuthUser, AppError> {
    let result = bearer_token(headers).and_then(|token| verify_token(token, jwt_config));
    track_jwt_validation(result.is_ok());
    result.map(AuthUser)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(auth_user.clone());
        }

        authenticate(&parts.headers, &state.jwt_config)
    }
}

/// Rejects requests without a valid bearer token.
///
/// Runs ahead of the route's cache layers and records the caller as
/// [`CacheUser`], so user-scoped cache keys are built from the verified
/// subject rather than anything the client sends.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = authenticate(request.headers(), &state.jwt_config)?;

    request
        .extensions_mut()
        .insert(CacheUser(auth_user.user_id().to_string()));
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use fridgewise_auth::create_access_token;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            access_token_expiry: 3600,
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(
            bearer_token(&HeaderMap::new()).unwrap_err().status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            bearer_token(&headers("Basic abc")).unwrap_err().status,
            StatusCode::UNAUTHORIZED
        );
        assert!(bearer_token(&headers("Bearer ")).is_err());
    }

    #[test]
    fn test_authenticate_valid_token() {
        let config = jwt_config();
        let token = create_access_token("user-1", "cook@example.com", &config).unwrap();

        let auth_user = authenticate(&headers(&format!("Bearer {token}")), &config).unwrap();
        assert_eq!(auth_user.user_id(), "user-1");
        assert_eq!(auth_user.email(), "cook@example.com");
    }

    #[test]
    fn test_authenticate_rejects_foreign_token() {
        let token = create_access_token(
            "user-1",
            "cook@example.com",
            &JwtConfig {
                secret: "other-secret".into(),
                access_token_expiry: 3600,
            },
        )
        .unwrap();

        let err = authenticate(&headers(&format!("Bearer {token}")), &jwt_config()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
