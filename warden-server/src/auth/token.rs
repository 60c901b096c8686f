//! Token issuance and validation
//!
//! Self-contained HS256 tokens: subject, issued-at, expiry. Nothing is
//! stored server-side and there is no revocation or refresh. The signing key
//! is loaded once at construction and stays constant for the process
//! lifetime; rotating it invalidates every outstanding token.

use crate::core::{WardenError, WardenResult};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims carried by an issued token. Roles are deliberately absent; they
/// are resolved fresh from storage on every request, so a revoked role takes
/// effect without re-login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates signed identity tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token is invalid the second its TTL elapses.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Issue a token for the subject, expiring after the configured TTL
    pub fn issue(&self, subject: &str) -> WardenResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| WardenError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Validate a token and return its subject.
    ///
    /// Malformed tokens, bad signatures and expired tokens all collapse into
    /// the single `InvalidToken` kind so the response never reveals which
    /// check failed.
    pub fn validate(&self, token: &str) -> WardenResult<String> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => {
                debug!("Token validation failed: {}", e);
                Err(WardenError::InvalidToken)
            }
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
