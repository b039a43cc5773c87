//! HS256 access tokens.
//!
//! The API only verifies tokens; accounts and login live in the auth
//! service that shares `JWT_SECRET`. [`create_access_token`] exists for
//! that side of the contract and for tests.

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use fridgewise_config::JwtConfig;
use fridgewise_core::AppError;

use crate::claims::Claims;

/// Signs a token for `user_id` that expires after
/// `jwt_config.access_token_expiry` seconds.
///
/// ```ignore
/// let token = create_access_token("665f1c", "cook@example.com", &jwt_config)?;
/// ```
pub fn create_access_token(
    user_id: &str,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (iat + jwt_config.access_token_expiry).max(0) as usize,
        iat: iat as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to sign access token: {e}")))
}

/// Checks signature and expiry.
///
/// # Errors
///
/// 401 with `Not authorized, token expired` for an expired token and
/// `Not authorized, token failed` for anything else.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    );

    match decoded {
        Ok(data) => Ok(data.claims),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AppError::unauthorized(
            anyhow!("Not authorized, token expired"),
        )),
        Err(_) => Err(AppError::unauthorized(anyhow!(
            "Not authorized, token failed"
        ))),
    }
}
