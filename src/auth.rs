// src/auth.rs
use chrono::Utc;
use jsonwebtoken::dangerous_insecure_decode;
use serde::{Deserialize, Serialize};

/// Claims carried by the backend's JWT. Only `sub` and `exp` are relied on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

impl Claims {
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        (self.exp as i64) <= now_secs
    }
}

/// Reads the claims without checking the signature; the backend stays the authority.
/// Returns `None` for anything that is not a decodable JWT.
pub fn peek_claims(token: &str) -> Option<Claims> {
    dangerous_insecure_decode::<Claims>(token)
        .ok()
        .map(|data| data.claims)
}

/// True only when the token decodes and its `exp` has passed.
pub fn is_token_expired(token: &str) -> bool {
    peek_claims(token)
        .map(|claims| claims.is_expired_at(Utc::now().timestamp()))
        .unwrap_or(false)
}
