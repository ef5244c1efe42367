use dotenvy::dotenv;
use tracing::info;

use tripdesk::infra::{app::create_app, setup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    setup::init_tracing();

    let app_state = setup::init_app_state().await?;
    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
