//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres: the shared connection handle,
//! schema setup, row models and the per-resource repositories.

pub mod connection;
pub mod maps;
pub mod models;
pub mod schema;
pub mod strategies;

#[cfg(test)]
pub mod live;
#[cfg(test)]
pub mod memory;

pub use connection::{DatabaseConnection, DbError, RetryPolicy};
pub use maps::MapRepository;
pub use strategies::StrategyRepository;
