//! # StratHub Server
//!
//! Backend for a tactical-shooter companion app: serves map reference data
//! and user-authored strategies over a small REST API, backed by PostgreSQL.
//!
//! ## Architecture
//! - `config`: environment variable configuration
//! - `database`: shared connection with reconnect, schema setup, repositories
//! - `services`: the startup map-sync job
//! - `routes`: HTTP handlers (`health`, `maps`, `strategies`)
//! - `server`: router assembly, CORS, request logging, serving
//!
//! ## Environment Setup
//! Required: `FRONTEND_PORT`, `BACKEND_PORT`, `DB_HOST`, `DB_PORT`, `DB_USER`,
//! `DB_PASSWORD`, `DB_NAME`, `ENVIRONMENT`. A `.env` file is read if present.
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! curl http://localhost:$BACKEND_PORT/ping
//! ```

mod config;
mod database;
mod error;
mod routes;
mod server;
mod services;

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::database::{schema, DatabaseConnection};

/// Initialize the tracing subscriber: compact, timestamped console output,
/// filtered by `RUST_LOG` (defaults to `info`).
fn init_tracing(production: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(!production)
                .compact(),
        )
        .init();
}

/// Application entry point.
///
/// Startup order: environment → logging → database (with retry) → schema →
/// HTTP listener → one-shot map sync. Any startup failure exits with code 1
/// before the listener binds.
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let production = std::env::var("ENVIRONMENT")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);
    init_tracing(production);

    tracing::info!("🏁 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("🔧 Environment: {}", if config.environment.is_production() {
        "production"
    } else {
        "development"
    });

    let db = DatabaseConnection::new(config.database.clone());
    if let Err(e) = db.connect().await {
        tracing::error!("Error connecting to database: {}", e);
        return ExitCode::FAILURE;
    }

    let client = match db.client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Database unavailable after connect: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = schema::ensure_schema(&client).await {
        tracing::error!("{:#}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = server::start(&config, db).await {
        tracing::error!("{:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
