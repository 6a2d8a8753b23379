//! The `taskhub` library crate.
//!
//! Domain models, the bearer-token authenticator, persistence backends, routing
//! and error handling for the task API. `main.rs` wires them into an `HttpServer`;
//! the integration tests build the same app over the in-memory store.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
