//! # Services Module
//!
//! Background jobs that run alongside the HTTP server.

pub mod map_sync;
