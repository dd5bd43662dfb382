//! Session tokens: HS256 JWTs carrying the user id and role.

use campusnet_sdk::User;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject user id. Older clients sent it as `id` or `userId`.
    #[serde(alias = "id", alias = "userId")]
    pub sub: String,
    #[serde(default)]
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// # Errors
    /// Returns `TokenError::Invalid` when `sub` is not a UUID.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|e| TokenError::Invalid(format!("bad subject: {e}")))
    }
}

pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtCodec {
    #[must_use]
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// # Errors
    /// Returns `DomainError::Internal` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            role: user.user_type.as_str().to_owned(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        self.sign(&claims)
    }

    /// # Errors
    /// Returns `DomainError::Internal` if signing fails.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("failed to sign token: {e}")))
    }

    /// # Errors
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
