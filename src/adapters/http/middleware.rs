use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    adapters::http::{app_state::AppState, cookies::ACCESS_COOKIE},
    app_error::AppError,
    use_cases::auth::UserProfile,
};

/// The principal resolved by `require_auth`, available to downstream
/// handlers as a request extension.
#[derive(Clone)]
pub struct CurrentUser(pub UserProfile);

/// Session verifier for protected routes.
///
/// Token source: the `accessToken` cookie, falling back to an
/// `Authorization: Bearer` header. An expired token yields `TOKEN_EXPIRED`
/// (so clients know to try a refresh instead of re-login); any other
/// verification failure is a plain 401. The principal is re-resolved from
/// the store on every request, so tokens for deleted accounts stop working
/// immediately.
pub async fn require_auth(
    State(app_state): State<AppState>,
    cookies: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = cookies
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_owned())
        .or_else(|| bearer_token(&request));

    let Some(token) = token else {
        return Err(AppError::Unauthorized);
    };

    let claims = app_state.tokens.verify_access(&token)?;
    let user_id = claims.user_id()?;

    let profile = app_state
        .user_repo
        .find_profile_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(CurrentUser(profile));
    Ok(next.run(request).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_owned())
}
