//! Sshwifty runtime configuration, assembled from environment variables.

pub mod config;
pub mod observability;

pub use config::{Configuration, EnvLoader, Loader};
