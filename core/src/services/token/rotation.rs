//! Refresh token rotation

use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::token::{TokenKind, TokenPair};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::RevocationRegistry;

use super::issuer::TokenIssuer;
use super::validator::TokenValidator;

/// Exchanges a refresh token for a new pair, using it up in the process
///
/// With a registry, each refresh token is single-use: the presented token is
/// revoked before the new pair is minted, so a failed mint still leaves it
/// unusable. Without one, refresh tokens stay reusable until they expire.
pub struct RotationController {
    issuer: Arc<TokenIssuer>,
    validator: Arc<TokenValidator>,
    registry: Option<Arc<dyn RevocationRegistry>>,
}

impl RotationController {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        validator: Arc<TokenValidator>,
        registry: Option<Arc<dyn RevocationRegistry>>,
    ) -> Self {
        Self {
            issuer,
            validator,
            registry,
        }
    }

    /// Rotates `refresh_token` into a fresh pair for the same identity
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - New access and refresh tokens
    /// * `Err(TokenError::TokenRevoked)` - Already used, including by a
    ///   concurrent rotation that won the race
    /// * `Err(TokenError::WrongTokenType)` - An access token was presented
    /// * Any other validation or mint error, unchanged
    pub async fn rotate(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.validator.validate(refresh_token).await?;
        if claims.kind != TokenKind::Refresh {
            return Err(TokenError::WrongTokenType {
                expected: TokenKind::Refresh,
                actual: claims.kind,
            }
            .into());
        }

        if let Some(registry) = &self.registry {
            let revoked = registry
                .try_revoke(refresh_token, &claims.user_id, claims.expires_at())
                .await?;
            if !revoked {
                debug!(user_id = %claims.user_id, jti = %claims.jti, "Refresh token replayed during rotation");
                return Err(TokenError::TokenRevoked.into());
            }
        }

        let pair = self.issuer.mint_pair(
            &claims.user_id,
            &claims.username,
            &claims.role,
            claims.metadata,
        )?;

        debug!(user_id = %claims.user_id, old_jti = %claims.jti, "Refresh token rotated");
        Ok(pair)
    }
}
