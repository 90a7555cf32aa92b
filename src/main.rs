mod core;
mod logging;
mod pipeline;
mod providers;
mod retrieval;
mod server;
mod session;
mod state;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use crate::core::config::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    logging::init(&settings.log_dir);

    let bind_addr = format!("0.0.0.0:{}", settings.port);
    let state = AppState::initialize(settings)
        .await
        .context("failed to initialize application state")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
