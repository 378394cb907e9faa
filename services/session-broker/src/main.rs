//! OIDC session-token broker
//!
//! Single-binary Rust service that:
//! 1. Redirects browsers to the identity provider for login
//! 2. Exchanges authorization codes for provider tokens
//! 3. Issues opaque session tokens backed by the session store
//! 4. Enforces the token on every request and rotates it on refresh

mod auth;
mod config;
mod error;
mod metrics;
mod routes;

use std::time::Duration;

use anyhow::{Context, Result};
use oidc::{OidcClient, ProviderEndpoints};
use session::{RedisSessionStore, SessionManager};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting session-broker");

    // Install the Prometheus recorder before any metrics are emitted
    let prometheus = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        listen_addr = %config.server.listen_addr,
        provider = %config.provider.base_url,
        realm = %config.provider.realm,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .build()
        .context("failed to build provider HTTP client")?;

    let client_secret = config
        .provider
        .client_secret
        .context("provider client secret missing after config load")?;

    let provider = OidcClient::new(
        http,
        ProviderEndpoints::new(&config.provider.base_url, &config.provider.realm),
        config.provider.client_id,
        client_secret,
        config.provider.redirect_uri,
    );

    let store = RedisSessionStore::connect(&config.store.redis_url)
        .await
        .context("failed to connect to the session store")?;
    info!("session store connected");

    let state = AppState {
        sessions: SessionManager::new(store, provider.clone()),
        provider,
        prometheus,
        started_at: std::time::Instant::now(),
    };

    let app = routes::build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;

    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
