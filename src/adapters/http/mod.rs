//! JSON REST adapter.
//!
//! Thin axum handlers over the service layer: bearer-token auth, camelCase
//! request/response DTOs, `{success, data}` envelopes.

pub mod auth;
pub mod error;
pub mod labels;
pub mod meetings;
pub mod relationships;
pub mod server;
pub mod thoughts;
pub mod topics;

pub use error::ApiError;
pub use server::{build_router, serve, AppState};
