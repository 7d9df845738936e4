//! Storymem Server
//!
//! HTTP surface for the story memory engine: child profiles, stories,
//! semantic story search, feedback and reading progress, behind a shared
//! bearer token.

pub mod api;
pub mod config;

pub use api::{build_router, serve, AppState};
pub use config::ServerConfig;
