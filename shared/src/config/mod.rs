//! Configuration module
//!
//! - `auth` - token authority settings (secret, lifetimes, revocation)
//! - `environment` - environment detection and logging configuration

pub mod auth;
pub mod environment;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use auth::{AuthSettings, JtiFallbackSetting};
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Token authority configuration
    #[serde(default)]
    pub auth: AuthSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            auth: AuthSettings::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            auth: AuthSettings::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from a file, with `AUTHER__*` environment overrides
    ///
    /// The file is optional; e.g. `AUTHER__AUTH__SECRET_KEY` overrides
    /// `auth.secret_key`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("AUTHER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
