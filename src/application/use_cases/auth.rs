//! Credential and session-token lifecycle: login, refresh rotation,
//! password reset, logout.
//!
//! All session truth lives in the user store. The only thing persisted about
//! a session is the current refresh token value; issuing a new one overwrites
//! (and thereby revokes) the previous one in a single write.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        jwt::{TokenIssuer, TokenPair},
        password,
    },
};

/// Full user record, including credential and session fields. Never crosses
/// the HTTP boundary; handlers see `UserProfile` only.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct UserAuth {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl UserAuth {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_auth_by_email(&self, email: &str) -> AppResult<Option<UserAuth>>;
    async fn find_auth_by_id(&self, id: Uuid) -> AppResult<Option<UserAuth>>;
    async fn find_profile_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Overwrite the stored refresh token in a single atomic write.
    /// `None` clears it (logout).
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()>;

    /// Atomically consume an unexpired reset token: set the new password
    /// hash, clear the reset fields and revoke any live refresh token, all
    /// in one statement. Returns the affected user id, or `None` when no
    /// matching unexpired token exists (already consumed, expired, or never
    /// issued).
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: NaiveDateTime,
        new_password_hash: &str,
    ) -> AppResult<Option<Uuid>>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

pub struct AuthUseCases {
    repo: Arc<dyn UserRepo>,
    email: Arc<dyn EmailSender>,
    tokens: Arc<TokenIssuer>,
    frontend_origin: Url,
    reset_token_ttl_minutes: i64,
}

impl AuthUseCases {
    pub fn new(
        repo: Arc<dyn UserRepo>,
        email: Arc<dyn EmailSender>,
        tokens: Arc<TokenIssuer>,
        frontend_origin: Url,
        reset_token_ttl_minutes: i64,
    ) -> Self {
        Self { repo, email, tokens, frontend_origin, reset_token_ttl_minutes }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    #[instrument(skip(self, password_plain))]
    pub async fn login(
        &self,
        email: &str,
        password_plain: &str,
    ) -> AppResult<(UserProfile, TokenPair)> {
        let email = email.trim().to_lowercase();
        let user = self.repo.find_auth_by_email(&email).await?.ok_or(AppError::NotFound)?;

        if !password::verify(password_plain, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.start_session(user.id, &user.email).await?;
        Ok((user.profile(), pair))
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// The presented token must match the stored value exactly; a token that
    /// was valid before a rotation is treated as stolen-and-replayed and
    /// rejected. Every failure here is a 401 variant, nothing more specific.
    #[instrument(skip_all)]
    pub async fn refresh(&self, presented: &str) -> AppResult<TokenPair> {
        let claims = self.tokens.verify_refresh(presented).map_err(|_| AppError::Unauthorized)?;
        let user_id = claims.user_id()?;

        let user = self.repo.find_auth_by_id(user_id).await?.ok_or(AppError::Unauthorized)?;

        match user.refresh_token.as_deref() {
            Some(stored) if stored == presented => {}
            _ => return Err(AppError::StaleRefreshToken),
        }

        self.start_session(user.id, &user.email).await
    }

    /// Issue a pair and persist the refresh half. The single UPDATE is the
    /// rotation point: whatever token was stored before stops working.
    async fn start_session(&self, user_id: Uuid, email: &str) -> AppResult<TokenPair> {
        let pair = self.tokens.issue_pair(user_id, email)?;
        self.repo.set_refresh_token(user_id, Some(&pair.refresh)).await?;
        Ok(pair)
    }

    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let user = self.repo.find_auth_by_email(&email).await?.ok_or(AppError::NotFound)?;

        let raw = generate_reset_token();
        let expires_at =
            (Utc::now() + chrono::Duration::minutes(self.reset_token_ttl_minutes)).naive_utc();
        self.repo.set_reset_token(user.id, &hash_token(&raw), expires_at).await?;

        let link = format!("{}reset-password?token={}", self.frontend_origin, raw);
        self.email
            .send(
                &user.email,
                "Reset your password",
                &format!(
                    "<p>You asked to reset your password. The link below is valid for {} minutes.</p>\
                     <a href=\"{}\">Choose a new password</a>",
                    self.reset_token_ttl_minutes, link
                ),
            )
            .await
    }

    /// Consume a reset token and set the new password. Single-use: the same
    /// token fails on a second call, and an expired token never matches.
    /// Consuming a reset also revokes any live refresh token.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> AppResult<()> {
        if new_password.is_empty() {
            return Err(AppError::InvalidInput("New password is required".into()));
        }
        let new_hash = password::hash(new_password)?;
        let now = Utc::now().naive_utc();
        self.repo
            .consume_reset_token(&hash_token(raw_token), now, &new_hash)
            .await?
            .ok_or(AppError::ResetTokenInvalid)?;
        Ok(())
    }

    #[instrument(skip(self, current_plain, new_plain))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_plain: &str,
        new_plain: &str,
    ) -> AppResult<()> {
        if new_plain.is_empty() {
            return Err(AppError::InvalidInput("New password is required".into()));
        }
        let user = self.repo.find_auth_by_id(user_id).await?.ok_or(AppError::Unauthorized)?;
        if !password::verify(current_plain, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }
        let new_hash = password::hash(new_plain)?;
        self.repo.update_password(user_id, &new_hash).await
    }

    /// Clear the stored refresh token. Idempotent.
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        self.repo.set_refresh_token(user_id, None).await
    }
}

/// Opaque single-use token, mailed to the user. Only its digest is stored.
fn generate_reset_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
