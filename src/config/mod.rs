//! Configuration management for vidbundle
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use vidbundle::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `VIDBUNDLE__<section>__<key>`
//!
//! Examples:
//! - `VIDBUNDLE__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `VIDBUNDLE__API__MAX_PAGES=4`
//! - `VIDBUNDLE__HTTP__MAX_ASSET_BYTES=512MB`
//!
//! Secrets are only read from the environment: `VIDBUNDLE_API_KEY` (or
//! `PIXABAY_API_KEY`) for the video API and `VIDBUNDLE_ACCESS_KEY` for the
//! login gate.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/vidbundle.toml`.
//! This can be overridden using the `VIDBUNDLE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    ArchiveSettings, AuthConfig, Config, FormDefaults, HttpSettings, Secret, ServerConfig,
    VideoApiConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`VIDBUNDLE__*`)
    /// 2. TOML file (default: `config/vidbundle.toml`)
    /// 3. Default values
    ///
    /// Secrets are loaded but not required here; see [`Config::api_key`] and
    /// [`Config::access_key`].
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, without reading secrets
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Video API credential, or a blocking error when it is not configured
    pub fn api_key(&self) -> Result<&Secret, ConfigError> {
        Ok(validation::require_api_key(self)?)
    }

    /// Login gate secret, or a blocking error when it is not configured
    pub fn access_key(&self) -> Result<&Secret, ConfigError> {
        Ok(validation::require_access_key(self)?)
    }

    /// Effective configuration as TOML; secrets are never included
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
