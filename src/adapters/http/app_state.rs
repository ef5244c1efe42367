use std::sync::Arc;

use crate::{
    application::jwt::TokenIssuer,
    infra::config::AppConfig,
    use_cases::auth::{AuthUseCases, UserRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub user_repo: Arc<dyn UserRepo>,
}
