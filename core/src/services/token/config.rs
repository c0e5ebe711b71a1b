//! Configuration for the token services

use std::fmt;
use std::time::Duration;

use auther_shared::config::auth::{
    AuthSettings, JtiFallbackSetting, DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_CLEANUP_INTERVAL_SECS,
    DEFAULT_ISSUER, DEFAULT_REFRESH_TOKEN_TTL_SECS,
};

use crate::errors::{DomainError, DomainResult};

/// Policy when the secure random source cannot produce a token id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JtiFallback {
    /// Use `jti_<unix-nanos>` and log a warning. Uniqueness is no longer
    /// guaranteed across instances minting in the same nanosecond.
    #[default]
    Timestamp,
    /// Fail the mint call with `TokenGenerationFailed`
    Reject,
}

impl From<JtiFallbackSetting> for JtiFallback {
    fn from(setting: JtiFallbackSetting) -> Self {
        match setting {
            JtiFallbackSetting::Timestamp => JtiFallback::Timestamp,
            JtiFallbackSetting::Reject => JtiFallback::Reject,
        }
    }
}

/// Configuration for the token authority
///
/// Passed through [`AutherConfig::normalized`] when the service is built and
/// never changed afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct AutherConfig {
    /// HMAC signing secret (required)
    pub secret_key: String,
    /// Access token lifetime used by `mint_pair`
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Issuer, also written as the audience
    pub issuer: String,
    /// Track revocations; when off, refresh tokens are reusable
    pub revocation_enabled: bool,
    /// Period of the background sweep
    pub cleanup_interval: Duration,
    pub jti_fallback: JtiFallback,
}

impl Default for AutherConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::from_secs(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            issuer: DEFAULT_ISSUER.to_string(),
            revocation_enabled: true,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            jti_fallback: JtiFallback::default(),
        }
    }
}

// Keeps the secret out of logs
impl fmt::Debug for AutherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutherConfig")
            .field("secret_key", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("issuer", &self.issuer)
            .field("revocation_enabled", &self.revocation_enabled)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("jti_fallback", &self.jti_fallback)
            .finish()
    }
}

impl AutherConfig {
    /// Create a configuration with a secret and defaults for everything else
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_revocation(mut self, enabled: bool) -> Self {
        self.revocation_enabled = enabled;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    pub fn with_jti_fallback(mut self, policy: JtiFallback) -> Self {
        self.jti_fallback = policy;
        self
    }

    /// Validate and fill in defaults
    ///
    /// The secret and issuer are trimmed. A blank secret is a configuration
    /// error; zero durations and a blank issuer fall back to the defaults.
    /// `revocation_enabled` is kept as given.
    pub fn normalized(&self) -> DomainResult<Self> {
        let secret_key = self.secret_key.trim();
        if secret_key.is_empty() {
            return Err(DomainError::Configuration {
                message: "secret key is required".to_string(),
            });
        }

        let defaults = Self::default();
        let issuer = self.issuer.trim();

        Ok(Self {
            secret_key: secret_key.to_string(),
            access_token_ttl: non_zero_or(self.access_token_ttl, defaults.access_token_ttl),
            refresh_token_ttl: non_zero_or(self.refresh_token_ttl, defaults.refresh_token_ttl),
            issuer: if issuer.is_empty() {
                defaults.issuer
            } else {
                issuer.to_string()
            },
            revocation_enabled: self.revocation_enabled,
            cleanup_interval: non_zero_or(self.cleanup_interval, defaults.cleanup_interval),
            jti_fallback: self.jti_fallback,
        })
    }
}

impl TryFrom<&AuthSettings> for AutherConfig {
    type Error = DomainError;

    fn try_from(settings: &AuthSettings) -> Result<Self, Self::Error> {
        Self {
            secret_key: settings.secret_key.clone(),
            access_token_ttl: Duration::from_secs(settings.access_token_ttl),
            refresh_token_ttl: Duration::from_secs(settings.refresh_token_ttl),
            issuer: settings.issuer.clone(),
            revocation_enabled: settings.revocation_enabled,
            cleanup_interval: Duration::from_secs(settings.cleanup_interval),
            jti_fallback: settings.jti_fallback.into(),
        }
        .normalized()
    }
}

fn non_zero_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}
