//! Access token payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims carried by a FridgeWise access token.
///
/// `sub` is the user id. The response cache scopes per-user entries by it,
/// so two tokens for the same user share cached search results. Tokens from
/// the auth service name the user `id` and may omit `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    #[serde(alias = "id")]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: usize,
    /// Issued at, seconds since the Unix epoch
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Seconds the token had left at `now`; zero once expired.
    pub fn remaining_secs(&self, now: usize) -> usize {
        self.exp.saturating_sub(now)
    }
}
