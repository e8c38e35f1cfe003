//! Server configuration loading.
//!
//! Figment merges defaults, the `.cadence/` YAML files, and `CADENCE_`
//! environment variables into the typed [`Config`](crate::domain::models::Config),
//! then validates the result before anything binds a port or opens the
//! database.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
