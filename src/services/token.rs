//! Signed, expiring bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id as `sub`. Decoding collapses
//! every failure into a single `InvalidToken` so callers cannot tell a bad
//! signature from an expired one.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token could not be signed")]
    Signing,
    #[error("invalid or expired token")]
    InvalidToken,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    validation: Arc<Validation>,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            validation: Arc::new(validation),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it were minted at `issued_at`.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify signature and expiry and return the user id.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::InvalidToken)?;
        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidToken)
    }
}
