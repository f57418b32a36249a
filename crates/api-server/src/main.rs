//! Weekly planner server
//!
//! Serves the REST API, the GraphQL endpoint, file uploads and Socket.IO
//! live connections on a single port.

mod config;
mod error;
mod extract;
mod graphql;
mod routes;
mod socket;
mod state;

use anyhow::Context;
use axum::Router;
use socketioxide::SocketIo;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner_core::store::open_store;

use crate::config::Config;
use crate::socket::{create_socket_layer, spawn_change_forwarder, SocketState};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "planner_server=debug,planner_core=info,tower_http=debug,socketioxide=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Using store {} and upload dir {:?}", config.store_uri, config.upload_dir);

    let store = open_store(&config.store_uri)
        .await
        .context("Failed to open record store")?;
    let app_state = AppState::new(Arc::clone(&store), &config);
    let (app, io) = build_app(app_state.clone(), &config);
    let forwarder = spawn_change_forwarder(io, app_state.planner().subscribe());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {} (GraphQL at {})", addr, config.graphql_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    forwarder.abort();
    store.close().await.context("Failed to close record store")?;
    info!("Server shutdown complete");
    Ok(())
}

/// HTTP routes plus the Socket.IO layer sharing the same listener
fn build_app(app_state: AppState, config: &Config) -> (Router, SocketIo) {
    let socket_state = SocketState {
        planner: app_state.planner().clone(),
        connections: app_state.connections().clone(),
    };
    let (socket_layer, io) = create_socket_layer(socket_state);

    let app = routes::router(config)
        .with_state(app_state)
        .layer(socket_layer)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    (app, io)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
