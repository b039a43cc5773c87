use std::env;

use tracing::warn;

/// Fallback signing secret for local runs without `JWT_SECRET`.
pub const DEV_SECRET: &str = "fridgewise-dev-secret";

const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Verification settings for the bearer tokens issued to FridgeWise users.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    /// Reads `JWT_SECRET` and `JWT_EXPIRES_IN` (seconds, default one week).
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET is not set; using the development secret");
            DEV_SECRET.to_string()
        });

        let access_token_expiry = env::var("JWT_EXPIRES_IN")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(WEEK_SECS);

        Self {
            secret,
            access_token_expiry,
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }
}
