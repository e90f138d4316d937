//! Schema initialization
//!
//! Idempotent DDL issued on every start. Any failure aborts startup.

use anyhow::{Context, Result};
use tokio_postgres::Client;

const CREATE_MAPS: &str = r#"
    CREATE TABLE IF NOT EXISTS maps (
        id SERIAL PRIMARY KEY,
        uuid VARCHAR(255) NOT NULL UNIQUE,
        display_name VARCHAR(255) NOT NULL,
        display_icon VARCHAR(255),
        list_view_icon VARCHAR(255),
        list_view_icon_tall VARCHAR(255),
        splash VARCHAR(255),
        stylized_background_image VARCHAR(255),
        premier_background_image VARCHAR(255),
        gamemode VARCHAR(255) NOT NULL DEFAULT 'competitive',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_STRATEGIES: &str = r#"
    CREATE TABLE IF NOT EXISTS strategies (
        id SERIAL PRIMARY KEY,
        uuid UUID NOT NULL UNIQUE,
        display_name VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Tables in creation order
pub const TABLES: [(&str, &str); 2] = [("maps", CREATE_MAPS), ("strategies", CREATE_STRATEGIES)];

/// Create every known table if it does not exist yet
pub async fn ensure_schema(client: &Client) -> Result<()> {
    tracing::info!("Checking database schema...");

    for (table, ddl) in TABLES {
        client
            .batch_execute(ddl)
            .await
            .with_context(|| format!("Failed to create table '{}'", table))?;
        tracing::debug!("Table '{}' ready", table);
    }

    tracing::info!("Database schema ready ({} tables)", TABLES.len());
    Ok(())
}
