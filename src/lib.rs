//! Library crate for playloop-back, exposing modules for binaries and integration tests.

/// JSON configuration loading.
pub mod config;
/// Persistence: models, document store backends and repositories.
pub mod dao;
/// Request and response shapes of the HTTP API.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers and handlers.
pub mod routes;
/// Business logic over the document store.
pub mod services;
/// Shared application state.
pub mod state;
