//! Signed, self-contained claims tokens (HS256).
//!
//! The codec itself is kind-agnostic; `TokenIssuer` enforces the
//! access/refresh distinction by signing each kind with its own secret and
//! TTL. Verification is purely cryptographic and never touches the store.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access: String,
    #[serde(rename = "refreshToken")]
    pub refresh: String,
}

/// Holds the per-kind secrets and TTLs. Handlers and use cases go through
/// this rather than picking a secret at the call site.
pub struct TokenIssuer {
    access_secret: SecretString,
    refresh_secret: SecretString,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        access_secret: SecretString,
        refresh_secret: SecretString,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self { access_secret, refresh_secret, access_ttl, refresh_ttl }
    }

    fn secret(&self, kind: TokenKind) -> &SecretString {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    pub fn issue(&self, kind: TokenKind, user_id: Uuid, email: &str) -> AppResult<String> {
        issue(user_id, email, self.secret(kind), self.ttl(kind))
    }

    pub fn issue_pair(&self, user_id: Uuid, email: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access: self.issue(TokenKind::Access, user_id, email)?,
            refresh: self.issue(TokenKind::Refresh, user_id, email)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        verify(token, &self.access_secret)
    }

    pub fn verify_refresh(&self, token: &str) -> AppResult<Claims> {
        verify(token, &self.refresh_secret)
    }
}

pub fn issue(
    user_id: Uuid,
    email: &str,
    secret: &SecretString,
    ttl: Duration,
) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let exp = now + ttl.whole_seconds();
    let claims = Claims { sub: user_id.to_string(), email: email.to_string(), iat: now, exp };
    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.expose_secret().as_bytes()))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Verify signature and expiry. Expired tokens map to `TokenExpired` so the
/// session middleware can tell clients to refresh; every other failure
/// collapses into `Unauthorized` (no malformed-vs-bad-signature oracle).
pub fn verify(token: &str, secret: &SecretString) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::Unauthorized,
    })
}
