//! labwarden web server
//!
//! Run with: cargo run -p labwarden-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use labwarden_web::{config::Config, router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("labwarden=debug,info")),
        )
        .init();

    info!("Starting labwarden...");

    let config = Config::load()?;
    let store = config.storage.open().await?;
    let assessor = config.llm.build_assessor()?;

    let state = AppState::new(store, assessor);
    let app = build_router(state, config.server.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
