//! CLI command implementations.

pub mod init;
pub mod label;
pub mod pair;
pub mod serve;
pub mod user;
