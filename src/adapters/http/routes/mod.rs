pub mod auth;
pub mod user;

use axum::{Router, middleware};

use crate::adapters::http::{app_state::AppState, middleware::require_auth};

pub fn router(app_state: AppState) -> Router<AppState> {
    let protected =
        user::router().route_layer(middleware::from_fn_with_state(app_state, require_auth));

    Router::new().nest("/users", auth::router().merge(protected))
}
