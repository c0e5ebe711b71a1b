//! Main token service implementation

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::entities::token::{Claims, Metadata, TokenArtifact, TokenKind, TokenPair, UnverifiedClaims};
use crate::errors::DomainResult;
use crate::repositories::{InMemoryRevocationRegistry, RevocationRegistry};

use super::cleanup::CleanupScheduler;
use super::config::AutherConfig;
use super::issuer::TokenIssuer;
use super::rotation::RotationController;
use super::validator::{peek_claims, TokenValidator};

/// Token authority: mints, validates, rotates and revokes session tokens
///
/// When revocation is enabled the service owns a [`CleanupScheduler`] that
/// sweeps the registry every `cleanup_interval`; call [`AutherService::close`]
/// (or drop the service) to stop it.
pub struct AutherService {
    config: Arc<AutherConfig>,
    issuer: Arc<TokenIssuer>,
    validator: Arc<TokenValidator>,
    rotation: RotationController,
    registry: Option<Arc<dyn RevocationRegistry>>,
    scheduler: Option<CleanupScheduler>,
}

impl AutherService {
    /// Creates a service backed by an in-memory revocation registry
    ///
    /// # Arguments
    ///
    /// * `config` - Normalized before use; a blank secret is rejected
    ///
    /// # Returns
    ///
    /// * `Ok(AutherService)` - Ready to use
    /// * `Err(DomainError::Configuration)` - Missing secret, or revocation is
    ///   enabled outside a Tokio runtime
    pub fn new(config: AutherConfig) -> DomainResult<Self> {
        Self::with_registry(config, Arc::new(InMemoryRevocationRegistry::new()))
    }

    /// Creates a service that records revocations in `registry`
    ///
    /// The registry is ignored when revocation is disabled.
    pub fn with_registry(config: AutherConfig, registry: Arc<dyn RevocationRegistry>) -> DomainResult<Self> {
        let config = Arc::new(config.normalized()?);

        let (registry, scheduler) = if config.revocation_enabled {
            let scheduler = CleanupScheduler::start(Arc::clone(&registry), config.cleanup_interval)?;
            (Some(registry), Some(scheduler))
        } else {
            warn!("Token revocation is disabled: revoke is a no-op and refresh tokens can be replayed until they expire");
            (None, None)
        };

        let issuer = Arc::new(TokenIssuer::new(Arc::clone(&config)));
        let validator = Arc::new(TokenValidator::new(Arc::clone(&config), registry.clone()));
        let rotation = RotationController::new(Arc::clone(&issuer), Arc::clone(&validator), registry.clone());

        info!(
            issuer = %config.issuer,
            revocation_enabled = config.revocation_enabled,
            "Token service initialized"
        );

        Ok(Self {
            config,
            issuer,
            validator,
            rotation,
            registry,
            scheduler,
        })
    }

    pub fn config(&self) -> &AutherConfig {
        &self.config
    }

    /// Mints an access/refresh pair with the configured lifetimes
    pub fn mint_pair(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        metadata: Option<Metadata>,
    ) -> DomainResult<TokenPair> {
        Ok(self.issuer.mint_pair(user_id, username, role, metadata)?)
    }

    /// Mints a standalone access token with a caller-chosen lifetime
    pub fn mint_access(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        ttl: Duration,
        metadata: Option<Metadata>,
    ) -> DomainResult<TokenArtifact> {
        Ok(self.issuer.mint_access(user_id, username, role, ttl, metadata)?)
    }

    /// Validates a token of either kind
    ///
    /// Only an `Ok` result may be used to authorize anything.
    pub async fn validate(&self, token: &str) -> DomainResult<Claims> {
        self.validator.validate(token).await
    }

    pub async fn validate_access(&self, token: &str) -> DomainResult<Claims> {
        self.validator.validate_kind(token, TokenKind::Access).await
    }

    pub async fn validate_refresh(&self, token: &str) -> DomainResult<Claims> {
        self.validator.validate_kind(token, TokenKind::Refresh).await
    }

    /// Exchanges a refresh token for a new pair
    ///
    /// With revocation disabled the presented token stays valid.
    pub async fn rotate(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.rotation.rotate(refresh_token).await
    }

    /// Revokes a token until its own expiry
    ///
    /// The signature must verify; time claims are not checked, so an already
    /// expired token can be revoked harmlessly. A no-op when revocation is
    /// disabled.
    pub async fn revoke_token(&self, token: &str) -> DomainResult<()> {
        let Some(registry) = &self.registry else {
            debug!("Revocation disabled; ignoring revoke request");
            return Ok(());
        };

        let claims = self.validator.verify_signature(token)?;
        registry.revoke(token, &claims.user_id, claims.expires_at()).await
    }

    /// Whether `token` is currently revoked; always `false` when disabled
    pub async fn is_token_revoked(&self, token: &str) -> DomainResult<bool> {
        match &self.registry {
            Some(registry) => registry.is_revoked(token).await,
            None => Ok(false),
        }
    }

    /// Runs one sweep now instead of waiting for the next tick
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Entries removed; 0 when revocation is disabled
    pub async fn cleanup_expired_tokens(&self) -> DomainResult<usize> {
        match &self.registry {
            Some(registry) => registry.sweep().await,
            None => Ok(0),
        }
    }

    /// Decodes a token's payload without verifying it
    ///
    /// For diagnostics only; the result is untrusted.
    pub fn token_info(&self, token: &str) -> DomainResult<UnverifiedClaims> {
        Ok(peek_claims(token)?)
    }

    /// Number of entries in the revocation registry; 0 when disabled
    pub async fn registry_size(&self) -> DomainResult<usize> {
        match &self.registry {
            Some(registry) => registry.size().await,
            None => Ok(0),
        }
    }

    /// Stops the background sweep
    ///
    /// Safe to call any number of times, and when no sweep was started.
    pub fn close(&self) -> DomainResult<()> {
        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }
        Ok(())
    }

    /// Whether the background sweep is running
    pub fn is_cleanup_running(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(|scheduler| !scheduler.is_finished())
    }
}
