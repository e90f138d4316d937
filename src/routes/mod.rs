// # Routes Module
//
// - HTTP handlers grouped by resource. Each resource module exposes a
//   `create_routes()` that `server.rs` merges into the main router.
//
// ## Available Route Modules
// - `health`: liveness and readiness endpoints
// - `maps`: map reference data (read-only)
// - `strategies`: strategy CRUD

/// Liveness and readiness endpoints
pub mod health;

/// Map listing endpoints
pub mod maps;

/// Strategy CRUD endpoints
pub mod strategies;
