use std::{env, net::SocketAddr};

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    /// Signs short-lived access tokens. Distinct from the refresh secret so
    /// the two token kinds can never be swapped for one another.
    pub access_token_secret: SecretString,
    /// Signs long-lived refresh tokens.
    pub refresh_token_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub reset_token_ttl_minutes: i64,
    pub resend_api_key: SecretString,
    pub email_from: String,
    /// Base URL the reset-password link in outbound email points at.
    pub frontend_origin: Url,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Mark session cookies `Secure`. On in production, off for local dev.
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let access_token_secret =
            SecretString::from(env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET must be set"));
        let refresh_token_secret = SecretString::from(
            env::var("REFRESH_TOKEN_SECRET").expect("REFRESH_TOKEN_SECRET must be set"),
        );

        let access_token_ttl_days: i64 = env_default("ACCESS_TOKEN_TTL_DAYS", 1);
        let refresh_token_ttl_days: i64 = env_default("REFRESH_TOKEN_TTL_DAYS", 20);
        let reset_token_ttl_minutes: i64 = env_default("RESET_TOKEN_TTL_MINUTES", 15);

        let resend_api_key =
            SecretString::from(env::var("RESEND_API_KEY").expect("RESEND_API_KEY must be set"));
        let email_from = env::var("EMAIL_FROM").expect("EMAIL_FROM must be set");

        let frontend_origin: Url = env::var("FRONTEND_ORIGIN")
            .expect("FRONTEND_ORIGIN must be set")
            .parse()
            .expect("FRONTEND_ORIGIN must be a valid URL");
        let cors_origin: HeaderValue = env::var("CORS_ORIGIN")
            .unwrap_or("http://localhost:3000".to_string())
            .parse()
            .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let secure_cookies: bool = env_default("SECURE_COOKIES", true);

        Self {
            access_token_secret,
            refresh_token_secret,
            access_token_ttl: Duration::days(access_token_ttl_days),
            refresh_token_ttl: Duration::days(refresh_token_ttl_days),
            reset_token_ttl_minutes,
            resend_api_key,
            email_from,
            frontend_origin,
            cors_origin,
            bind_addr,
            database_url,
            secure_cookies,
        }
    }
}

fn env_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| panic!("{key} must be a valid value")),
        Err(_) => default,
    }
}
