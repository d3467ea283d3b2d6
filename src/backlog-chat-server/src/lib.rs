//! Backlog Chat Server - relays Backlog webhooks to Google Chat.
//!
//! This crate provides:
//! - `POST /v1/spaces/{space_id}/messages` accepting Backlog webhook payloads
//! - Card rendering through [`backlog_chat::Dispatcher`]
//! - Delivery to the Google Chat API under the same path
//! - A health check endpoint
//!
//! Unsupported event types are acknowledged with `{"message": "OK"}` and
//! never forwarded.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod delivery;
pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use delivery::{ChatClient, DeliveryError, DeliveryOutcome};
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Run the server with the given configuration.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, std::future::pending()).await
}

/// Run the server with graceful shutdown support.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = config.listen_addr.parse()?;
    let state = Arc::new(AppState::new(config)?);

    let listener = TcpListener::bind(addr).await?;
    info!("Starting Backlog chat relay on {}", addr);
    serve(listener, state, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, create_router_with_state(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_state(Arc::new(state))
}

/// Create the application router with an Arc-wrapped state.
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/spaces/{space_id}/messages", post(handlers::post_message))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
