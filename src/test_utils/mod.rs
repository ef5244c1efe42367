//! In-memory collaborators for unit and HTTP-level tests: a `UserRepo` over
//! a `HashMap`, an email sender that records instead of sending, and a
//! builder for a fully wired `AppState`.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use secrecy::SecretString;
use time::Duration;
use url::Url;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::jwt::TokenIssuer,
    infra::config::AppConfig,
    use_cases::auth::{AuthUseCases, EmailSender, UserAuth, UserProfile, UserRepo},
};

// Low bcrypt cost keeps the test suite fast; verification is cost-agnostic.
const TEST_BCRYPT_COST: u32 = 4;

pub fn test_user(email: &str, password: &str) -> UserAuth {
    UserAuth {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: email.to_lowercase(),
        password_hash: bcrypt::hash(password, TEST_BCRYPT_COST).unwrap(),
        refresh_token: None,
        reset_token_hash: None,
        reset_token_expires_at: None,
        created_at: Utc::now().naive_utc(),
    }
}

// ============================================================================
// InMemoryUserRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, UserAuth>>,
}

impl InMemoryUserRepo {
    pub fn with_users(users: Vec<UserAuth>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self { users: Mutex::new(map) }
    }

    /// Backdate a pending reset token so expiry paths can be exercised.
    pub fn expire_reset_token(&self, id: Uuid) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.reset_token_expires_at =
                Some((Utc::now() - chrono::Duration::minutes(1)).naive_utc());
        }
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_auth_by_email(&self, email: &str) -> AppResult<Option<UserAuth>> {
        Ok(self.users.lock().unwrap().values().find(|u| u.email == email).cloned())
    }

    async fn find_auth_by_id(&self, id: Uuid) -> AppResult<Option<UserAuth>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_profile_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.users.lock().unwrap().get(&id).map(|u| u.profile()))
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.refresh_token = token.map(|t| t.to_string());
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.reset_token_hash = Some(token_hash.to_string());
            user.reset_token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: NaiveDateTime,
        new_password_hash: &str,
    ) -> AppResult<Option<Uuid>> {
        let mut users = self.users.lock().unwrap();
        let matching = users.values_mut().find(|u| {
            u.reset_token_hash.as_deref() == Some(token_hash)
                && u.reset_token_expires_at.is_some_and(|exp| exp > now)
        });
        Ok(matching.map(|user| {
            user.password_hash = new_password_hash.to_string();
            user.reset_token_hash = None;
            user.reset_token_expires_at = None;
            user.refresh_token = None;
            user.id
        }))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}

// ============================================================================
// RecordingEmailSender
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Pull the raw reset token out of the `token=` query parameter of the
    /// most recently mailed link.
    pub fn last_reset_token(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let html = &sent.last()?.html;
        let start = html.find("token=")? + "token=".len();
        let rest = &html[start..];
        let end = rest.find('"').unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// TestAppStateBuilder
// ============================================================================

pub fn test_config() -> AppConfig {
    AppConfig {
        access_token_secret: SecretString::from("test-access-secret"),
        refresh_token_secret: SecretString::from("test-refresh-secret"),
        access_token_ttl: Duration::days(1),
        refresh_token_ttl: Duration::days(20),
        reset_token_ttl_minutes: 15,
        resend_api_key: SecretString::from("test-resend-key"),
        email_from: "noreply@tripdesk.test".to_string(),
        frontend_origin: Url::parse("https://tripdesk.test/").unwrap(),
        cors_origin: "http://localhost:3000".parse().unwrap(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        secure_cookies: false,
    }
}

#[derive(Default)]
pub struct TestAppStateBuilder {
    users: Vec<UserAuth>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserAuth) -> Self {
        self.users.push(user);
        self
    }

    pub fn build(self) -> (AppState, Arc<InMemoryUserRepo>, Arc<RecordingEmailSender>) {
        let config = Arc::new(test_config());
        let repo = Arc::new(InMemoryUserRepo::with_users(self.users));
        let email = Arc::new(RecordingEmailSender::default());

        let tokens = Arc::new(TokenIssuer::new(
            config.access_token_secret.clone(),
            config.refresh_token_secret.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        ));

        let auth_use_cases = Arc::new(AuthUseCases::new(
            repo.clone() as Arc<dyn UserRepo>,
            email.clone() as Arc<dyn EmailSender>,
            tokens.clone(),
            config.frontend_origin.clone(),
            config.reset_token_ttl_minutes,
        ));

        let state = AppState {
            config,
            tokens,
            auth_use_cases,
            user_repo: repo.clone() as Arc<dyn UserRepo>,
        };

        (state, repo, email)
    }
}
