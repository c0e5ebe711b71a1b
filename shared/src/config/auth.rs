//! Token authority settings

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Default access token lifetime (2 hours)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 2 * 60 * 60;

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default issuer (also used as the audience)
pub const DEFAULT_ISSUER: &str = "conan";

/// Default revocation sweep interval (1 hour)
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// What to do when the secure random source cannot produce a token id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JtiFallbackSetting {
    /// Use a nanosecond timestamp and log a warning
    #[default]
    Timestamp,
    /// Fail the mint call
    Reject,
}

impl std::str::FromStr for JtiFallbackSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timestamp" => Ok(JtiFallbackSetting::Timestamp),
            "reject" | "fail" => Ok(JtiFallbackSetting::Reject),
            _ => Err(format!("Invalid jti fallback policy: {}", s)),
        }
    }
}

/// Token authority configuration as read from files or the environment.
///
/// Durations are whole seconds. Zero values mean "use the default" once the
/// settings are turned into a runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// HMAC signing secret
    #[serde(default)]
    pub secret_key: String,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl: u64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl: u64,

    /// Issuer claim, also written as the audience
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Whether revoked tokens are tracked (and refresh tokens are single-use)
    #[serde(default = "default_revocation_enabled")]
    pub revocation_enabled: bool,

    /// How often expired revocation entries are purged, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,

    /// Token id fallback policy
    #[serde(default)]
    pub jti_fallback: JtiFallbackSetting,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            access_token_ttl: default_access_ttl(),
            refresh_token_ttl: default_refresh_ttl(),
            issuer: default_issuer(),
            revocation_enabled: default_revocation_enabled(),
            cleanup_interval: default_cleanup_interval(),
            jti_fallback: JtiFallbackSetting::default(),
        }
    }
}

impl AuthSettings {
    /// Create settings with a secret and defaults for everything else
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            secret_key: env::var("AUTHER_SECRET_KEY").unwrap_or_default(),
            access_token_ttl: parse_env("AUTHER_ACCESS_TOKEN_TTL", defaults.access_token_ttl),
            refresh_token_ttl: parse_env("AUTHER_REFRESH_TOKEN_TTL", defaults.refresh_token_ttl),
            issuer: env::var("AUTHER_ISSUER").unwrap_or(defaults.issuer),
            revocation_enabled: parse_env("AUTHER_REVOCATION_ENABLED", defaults.revocation_enabled),
            cleanup_interval: parse_env("AUTHER_CLEANUP_INTERVAL", defaults.cleanup_interval),
            jti_fallback: parse_env("AUTHER_JTI_FALLBACK", defaults.jti_fallback),
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_ttl_minutes(mut self, minutes: u64) -> Self {
        self.access_token_ttl = minutes * 60;
        self
    }

    /// Set refresh token lifetime in days
    pub fn with_refresh_ttl_days(mut self, days: u64) -> Self {
        self.refresh_token_ttl = days * 86400;
        self
    }

    /// Check whether a secret has been provided at all
    pub fn has_secret(&self) -> bool {
        !self.secret_key.trim().is_empty()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    let Ok(value) = env::var(key) else {
        return default;
    };
    value.trim().parse().unwrap_or_else(|_| {
        warn!(key, value = %value, "Ignoring unparseable environment value");
        default
    })
}

fn default_access_ttl() -> u64 {
    DEFAULT_ACCESS_TOKEN_TTL_SECS
}

fn default_refresh_ttl() -> u64 {
    DEFAULT_REFRESH_TOKEN_TTL_SECS
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

fn default_revocation_enabled() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AuthSettings::default();
        assert_eq!(settings.access_token_ttl, 7200);
        assert_eq!(settings.refresh_token_ttl, 604800);
        assert_eq!(settings.issuer, "conan");
        assert!(settings.revocation_enabled);
        assert_eq!(settings.cleanup_interval, 3600);
        assert_eq!(settings.jti_fallback, JtiFallbackSetting::Timestamp);
        assert!(!settings.has_secret());
    }

    #[test]
    fn test_builders() {
        let settings = AuthSettings::new("s3cret")
            .with_access_ttl_minutes(15)
            .with_refresh_ttl_days(30);
        assert!(settings.has_secret());
        assert_eq!(settings.access_token_ttl, 900);
        assert_eq!(settings.refresh_token_ttl, 30 * 86400);
    }

    #[test]
    fn test_whitespace_secret_is_missing() {
        assert!(!AuthSettings::new("   ").has_secret());
    }

    #[test]
    fn test_jti_fallback_parsing() {
        assert_eq!("timestamp".parse::<JtiFallbackSetting>(), Ok(JtiFallbackSetting::Timestamp));
        assert_eq!("REJECT".parse::<JtiFallbackSetting>(), Ok(JtiFallbackSetting::Reject));
        assert!("sometimes".parse::<JtiFallbackSetting>().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let settings = parse_toml("secret_key = \"abc\"\nissuer = \"svc\"\n");
        assert_eq!(settings.secret_key, "abc");
        assert_eq!(settings.issuer, "svc");
        assert_eq!(settings.access_token_ttl, DEFAULT_ACCESS_TOKEN_TTL_SECS);
        assert!(settings.revocation_enabled);
    }

    fn parse_toml(toml_text: &str) -> AuthSettings {
        config::Config::builder()
            .add_source(config::File::from_str(toml_text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
