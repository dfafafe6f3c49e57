use anyhow::{Context, Result};
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mealprep_server::backend::{create_router, initialize_backend};
use mealprep_server::config::ServerConfig;

const DEFAULT_LOG_FILTER: &str = "mealprep_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::parse();
    info!("Starting mealprep server with {:?}", config);

    let app_state = initialize_backend(&config).await?;
    let router = create_router(app_state, &config.cors_origin)?;

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, router).await.context("HTTP server error")?;
    Ok(())
}
