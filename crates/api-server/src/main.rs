//! API server for ClientManager Pro
//!
//! Serves the multi-tenant client REST API on a single port.

mod auth;
mod config;
mod routes;
mod seed;
mod state;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cm_api_server=debug,cm_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!("Using data directory: {:?}", config.data_dir);
    if config.callback_secret.is_none() {
        tracing::warn!("CM_AUTH_CALLBACK_SECRET not set, sign-in callback is disabled");
    }

    let app_state = AppState::new(&config)
        .await
        .context("Failed to initialize application state")?;

    if config.seed_demo {
        seed::seed_demo(app_state.service())
            .await
            .context("Failed to seed demo data")?;
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
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
