//! # conveyor-server
//!
//! HTTP surface for the Conveyor engine: table management, batch
//! upload, and per-consumer pull endpoints, plus configuration loading
//! and router assembly. The binary in `main.rs` wires this to a
//! Postgres pool.

pub mod api_types;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
