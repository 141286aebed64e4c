use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use leadscope_client::Engine;
use leadscope_core::config::ScraperConfig;
use leadscope_server::routes;
use leadscope_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadscope=info".parse()?))
        .with_target(false)
        .init();

    let port = std::env::var("LEADSCOPE_SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");

    let engine = match std::env::var("LEADSCOPE_ENGINE") {
        Ok(value) => value.parse::<Engine>()?,
        Err(_) => Engine::default(),
    };
    let config = ScraperConfig::from_env().context("Invalid LEADSCOPE_* configuration")?;

    let state = Arc::new(AppState { config, engine });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!(%engine, "Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
