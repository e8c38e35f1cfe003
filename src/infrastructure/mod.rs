//! Infrastructure layer module
//!
//! Cross-cutting concerns that sit outside the domain: configuration
//! loading and validation.

pub mod config;
