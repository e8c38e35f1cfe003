//! Domain layer for the cadence meeting server.
//!
//! Contains the core business entities, status state machines, and the
//! repository ports the adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
