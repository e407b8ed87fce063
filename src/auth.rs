//! Authentication: argon2id password hashing and HMAC-SHA256 signed bearer
//! tokens.
//!
//! Token format: `base64url(claims_json) . base64url(hmac_sha256(key, payload))`
//! where claims carry the user id (`sub`) and a unix expiry (`exp`, ~7 days).
//! The signing key comes from AUTH_TOKEN_SECRET; without it we generate a
//! random per-process key, which invalidates outstanding tokens on restart.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_TTL_DAYS: i64 = 7;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(plain: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| e.to_string())
}

/// Constant-time verification against a stored PHC string.
/// An unparseable hash counts as a failed verification, not an error.
pub fn verify_password(plain: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Shared signing key for bearer tokens.
pub struct TokenKeys {
    key: [u8; 32],
}

impl TokenKeys {
    /// Key from AUTH_TOKEN_SECRET (hashed to 32 bytes), or random per process.
    pub fn from_env() -> Self {
        match std::env::var("AUTH_TOKEN_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => {
                let mut hasher = Sha256::new();
                hasher.update(secret.as_bytes());
                Self { key: hasher.finalize().into() }
            }
            _ => {
                warn!(target: "brainrally_backend", "AUTH_TOKEN_SECRET not set; tokens will not survive a restart");
                let mut key = [0u8; 32];
                rand::rngs::OsRng.fill_bytes(&mut key);
                Self { key }
            }
        }
    }

    #[cfg(test)]
    fn from_key(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn issue(&self, user_id: &str, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", payload, sig)
    }

    /// Verify signature + expiry; returns the user id on success.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, String> {
        let (payload, sig) = token.split_once('.').ok_or("malformed token")?;
        let sig_bytes = URL_SAFE_NO_PAD.decode(sig).map_err(|_| "malformed signature")?;

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig_bytes).map_err(|_| "signature mismatch")?;

        let claims_bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| "malformed payload")?;
        let claims: Claims =
            serde_json::from_slice(&claims_bytes).map_err(|_| "malformed claims")?;
        if claims.exp < now.timestamp() {
            return Err("token expired".into());
        }
        Ok(claims.sub)
    }
}

/// Extractor for authenticated routes. Rejects with 401 on a missing,
/// malformed, tampered, or expired bearer token.
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Auth("missing bearer token".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Auth("missing bearer token".into()))?;
        let user_id = state.tokens.verify(token, Utc::now()).map_err(|e| {
            debug!(target: "brainrally_backend", error = %e, "Rejected bearer token");
            ApiError::Auth("invalid or expired token".into())
        })?;
        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let phc = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &phc));
        assert!(!verify_password("wrong password", &phc));
        assert!(!verify_password("correct horse battery", "not-a-phc-string"));
    }

    #[test]
    fn token_roundtrip_carries_user_id() {
        let keys = TokenKeys::from_key([7u8; 32]);
        let now = Utc::now();
        let token = keys.issue("user-123", now);
        assert_eq!(keys.verify(&token, now).unwrap(), "user-123");
        // Still valid just before expiry.
        let later = now + Duration::days(TOKEN_TTL_DAYS) - Duration::hours(1);
        assert_eq!(keys.verify(&token, later).unwrap(), "user-123");
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = TokenKeys::from_key([7u8; 32]);
        let now = Utc::now();
        let token = keys.issue("user-123", now);
        let later = now + Duration::days(TOKEN_TTL_DAYS + 1);
        assert!(keys.verify(&token, later).is_err());
    }

    #[test]
    fn tampered_or_garbage_tokens_are_rejected() {
        let keys = TokenKeys::from_key([7u8; 32]);
        let other = TokenKeys::from_key([9u8; 32]);
        let now = Utc::now();
        let token = keys.issue("user-123", now);

        assert!(other.verify(&token, now).is_err());
        assert!(keys.verify("garbage", now).is_err());
        assert!(keys.verify("", now).is_err());
        let mut tampered = token.clone();
        tampered.insert(2, 'x');
        assert!(keys.verify(&tampered, now).is_err());
    }
}
