//! Reference HTTP host for the routeguard authorization engine.
//!
//! Wires configuration, tracing, a config-backed permission store, and the
//! authorization middleware into a runnable axum service.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod store;

pub use config::{AppConfig, LoggingConfig, ServerConfig};
pub use server::{RouteguardServer, ServerBuilder, build_app, build_engine};
pub use store::StaticPermissionStore;
