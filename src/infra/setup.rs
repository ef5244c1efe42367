use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{email::resend::ResendEmailSender, http::app_state::AppState},
    application::jwt::TokenIssuer,
    infra::{config::AppConfig, postgres_persistence},
    use_cases::auth::{AuthUseCases, UserRepo},
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let persistence = Arc::new(postgres_persistence(&config.database_url).await?);

    let email = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    )?);

    let tokens = Arc::new(TokenIssuer::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    ));

    let auth_use_cases = Arc::new(AuthUseCases::new(
        persistence.clone() as Arc<dyn UserRepo>,
        email,
        tokens.clone(),
        config.frontend_origin.clone(),
        config.reset_token_ttl_minutes,
    ));

    Ok(AppState {
        config: Arc::new(config),
        tokens,
        auth_use_cases,
        user_repo: persistence as Arc<dyn UserRepo>,
    })
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "tripdesk=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
