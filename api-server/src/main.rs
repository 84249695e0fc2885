//! API server for the rental marketplace
//!
//! Serves the REST API on `RENTAL_BIND_ADDR` (port 8081 by default).

mod auth;
mod config;
mod error;
mod routes;
mod seed;
mod state;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rental_api=debug,rental_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(data_dir = %config.data_dir.display(), "using data directory");
    if config.uses_default_secret() {
        tracing::warn!("RENTAL_JWT_SECRET is not set; signing tokens with the development secret");
    }

    let app_state = AppState::new(&config)
        .await
        .context("failed to open market store")?;

    if let Some(admin) = &config.admin {
        seed::ensure_admin(&app_state, admin).await?;
    }

    let app = routes::router()
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
