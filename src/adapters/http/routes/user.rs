//! Routes behind the session verifier: current-user lookup, logout and
//! in-session password change.

use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::http::{app_state::AppState, cookies, envelope, middleware::CurrentUser},
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
}

async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    envelope::ok(StatusCode::OK, "User fetched successfully", json!({ "user": user }))
}

async fn logout(
    State(app_state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    app_state.auth_use_cases.logout(user.id).await?;

    let mut headers = HeaderMap::new();
    cookies::clear_session_cookies(&mut headers, &app_state.config)?;

    Ok((headers, envelope::ok_empty(StatusCode::OK, "User logged out successfully")))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordPayload {
    current_password: Option<String>,
    new_password: Option<String>,
}

async fn change_password(
    State(app_state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordPayload>,
) -> AppResult<impl IntoResponse> {
    let (current, new) = match (payload.current_password, payload.new_password) {
        (Some(c), Some(n)) if !c.is_empty() && !n.is_empty() => (c, n),
        _ => {
            return Err(AppError::InvalidInput("Current and new password are required".into()));
        }
    };

    app_state.auth_use_cases.change_password(user.id, &current, &new).await?;

    Ok(envelope::ok_empty(StatusCode::OK, "Password changed successfully"))
}
