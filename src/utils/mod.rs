//! Utilities: configuration loading.

/// TOML file and environment configuration.
pub mod config;

pub use config::{ConfigError, ConfigSource, Secrets, SenseiConfig};
