//! Shared configuration and logging setup for the auther workspace
//!
//! - Token authority settings loaded from files or the environment
//! - Environment detection
//! - Tracing subscriber initialisation

pub mod config;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthSettings, ConfigError, Environment, JtiFallbackSetting, LogFormat,
    LoggingConfig,
};
pub use logging::{init_tracing, LoggingError};
