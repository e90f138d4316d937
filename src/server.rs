//! # Server Module
//!
//! HTTP server setup and route configuration.
//!
//! The server has no stop/restart API. Its lifecycle belongs to whatever
//! supervises the process: SIGINT/SIGTERM drain in-flight requests and exit.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

use crate::config::{Config, ServerConfig};
use crate::database::{DatabaseConnection, MapRepository, StrategyRepository};
use crate::routes::{health, maps, strategies};
use crate::services::map_sync::{self, MapSource, ValorantApi};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub maps: Arc<dyn MapRepository>,
    pub strategies: Arc<dyn StrategyRepository>,
}

impl AppState {
    pub fn new(maps: Arc<dyn MapRepository>, strategies: Arc<dyn StrategyRepository>) -> Self {
        Self { maps, strategies }
    }
}

/// Log every inbound request before it reaches a handler
async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::info!("Request received: {} {}", method, path);

    let response = next.run(req).await;
    tracing::debug!("{} {} -> {}", method, path, response.status().as_u16());
    response
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]))
}

/// Assemble the full router: resource routes, request logging and CORS
pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .merge(maps::create_routes())
        .merge(strategies::create_routes())
        .layer(middleware::from_fn(log_request))
        .layer(cors_layer(&server.allowed_origins)?)
        .with_state(state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
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
    tracing::info!("Shutdown signal received, draining connections");
}

/// Bind the listener, kick off the one-shot map sync, and serve until a
/// shutdown signal arrives.
pub async fn start(config: &Config, db: Arc<DatabaseConnection>) -> Result<()> {
    let state = AppState::new(db.clone(), db.clone());
    let app = build_router(state, &config.server)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {} - port may already be in use", addr))?;

    tracing::info!("🚀 Server listening at http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🌐 CORS origins: {}", config.server.allowed_origins.join(", "));

    let source: Arc<dyn MapSource> =
        Arc::new(ValorantApi::new(&config.sync).context("Failed to build map API client")?);
    tokio::spawn(map_sync::run(source, db));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
