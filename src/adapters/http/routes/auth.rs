//! Public authentication routes: login, refresh-token rotation and the
//! password-reset pair.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::http::{
        app_state::AppState,
        cookies::{self, REFRESH_COOKIE},
        envelope,
    },
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[derive(Deserialize)]
struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(AppError::InvalidInput("Email and password are required".into())),
    };

    let (user, pair) = app_state.auth_use_cases.login(&email, &password).await?;

    let mut headers = HeaderMap::new();
    cookies::set_session_cookies(&mut headers, &pair, &app_state.config)?;

    Ok((
        headers,
        envelope::ok(
            StatusCode::OK,
            "User logged in successfully",
            json!({
                "user": user,
                "accessToken": pair.access,
                "refreshToken": pair.refresh,
            }),
        ),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    refresh_token: Option<String>,
}

async fn refresh_token(
    State(app_state): State<AppState>,
    jar: CookieJar,
    body: String,
) -> AppResult<impl IntoResponse> {
    // Cookie-first; the body is optional and may be empty for cookie-only
    // clients, so it is parsed leniently.
    let presented = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()).or_else(|| {
        serde_json::from_str::<RefreshPayload>(&body).ok().and_then(|p| p.refresh_token)
    });

    let Some(presented) = presented else {
        return Err(AppError::Unauthorized);
    };

    let pair = app_state.auth_use_cases.refresh(&presented).await?;

    let mut headers = HeaderMap::new();
    cookies::set_session_cookies(&mut headers, &pair, &app_state.config)?;

    Ok((
        headers,
        envelope::ok(
            StatusCode::OK,
            "Access token refreshed",
            json!({
                "accessToken": pair.access,
                "refreshToken": pair.refresh,
            }),
        ),
    ))
}

#[derive(Deserialize)]
struct ForgotPasswordPayload {
    email: Option<String>,
}

async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> AppResult<impl IntoResponse> {
    let email = payload
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Email is required".into()))?;

    app_state.auth_use_cases.request_password_reset(&email).await?;

    // The raw token travels only in the email.
    Ok(envelope::ok_empty(StatusCode::OK, "Password reset email sent"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordPayload {
    token: Option<String>,
    new_password: Option<String>,
}

async fn reset_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> AppResult<impl IntoResponse> {
    let (token, new_password) = match (payload.token, payload.new_password) {
        (Some(t), Some(p)) if !t.is_empty() && !p.is_empty() => (t, p),
        _ => return Err(AppError::InvalidInput("Token and new password are required".into())),
    };

    app_state.auth_use_cases.reset_password(&token, &new_password).await?;

    Ok(envelope::ok_empty(StatusCode::OK, "Password reset successfully"))
}
