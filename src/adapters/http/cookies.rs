//! Session-cookie transport. Both tokens travel as httpOnly SameSite=Lax
//! cookies whose max-age mirrors the token's own TTL.

use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::{
    app_error::{AppError, AppResult},
    application::jwt::TokenPair,
    infra::config::AppConfig,
};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

pub fn set_session_cookies(
    headers: &mut HeaderMap,
    pair: &TokenPair,
    config: &AppConfig,
) -> AppResult<()> {
    append(
        headers,
        session_cookie(ACCESS_COOKIE, pair.access.clone(), config.access_token_ttl, config),
    )?;
    append(
        headers,
        session_cookie(REFRESH_COOKIE, pair.refresh.clone(), config.refresh_token_ttl, config),
    )
}

pub fn clear_session_cookies(headers: &mut HeaderMap, config: &AppConfig) -> AppResult<()> {
    for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
        append(headers, session_cookie(name, String::new(), time::Duration::seconds(0), config))?;
    }
    Ok(())
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    config: &AppConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn append(headers: &mut HeaderMap, cookie: Cookie<'static>) -> AppResult<()> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    headers.append(axum::http::header::SET_COOKIE, value);
    Ok(())
}
