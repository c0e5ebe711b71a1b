//! Token minting

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::domain::entities::token::{Claims, Metadata, TokenArtifact, TokenKind, TokenPair};
use crate::errors::TokenError;

use super::config::{AutherConfig, JtiFallback};

/// Builds and signs claims into access and refresh tokens
pub struct TokenIssuer {
    config: Arc<AutherConfig>,
    encoding_key: EncodingKey,
    header: Header,
}

impl TokenIssuer {
    /// Creates an issuer signing with HS256 under the configured secret
    pub fn new(config: Arc<AutherConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        Self {
            config,
            encoding_key,
            header: Header::new(Algorithm::HS256),
        }
    }

    /// Mints an access token
    ///
    /// Always produces [`TokenKind::Access`]; refresh tokens can only come
    /// out of [`TokenIssuer::mint_pair`].
    ///
    /// # Arguments
    ///
    /// * `ttl` - Lifetime of this token, independent of the configured default
    /// * `metadata` - Opaque key/value pairs copied into the token
    pub fn mint_access(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        ttl: Duration,
        metadata: Option<Metadata>,
    ) -> Result<TokenArtifact, TokenError> {
        self.mint(TokenKind::Access, user_id, username, role, ttl, metadata)
    }

    /// Mints an access token and a refresh token with the configured lifetimes
    pub fn mint_pair(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        metadata: Option<Metadata>,
    ) -> Result<TokenPair, TokenError> {
        let access_token = self.mint_access(
            user_id,
            username,
            role,
            self.config.access_token_ttl,
            metadata.clone(),
        )?;
        let refresh_token = self.mint_refresh(user_id, username, role, metadata)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn mint_refresh(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        metadata: Option<Metadata>,
    ) -> Result<TokenArtifact, TokenError> {
        self.mint(
            TokenKind::Refresh,
            user_id,
            username,
            role,
            self.config.refresh_token_ttl,
            metadata,
        )
    }

    fn mint(
        &self,
        kind: TokenKind,
        user_id: &str,
        username: &str,
        role: &str,
        ttl: Duration,
        metadata: Option<Metadata>,
    ) -> Result<TokenArtifact, TokenError> {
        let claims = self.build_claims(kind, user_id, username, role, ttl, metadata)?;
        let token = encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            TokenError::TokenGenerationFailed {
                reason: e.to_string(),
            }
        })?;

        debug!(user_id, %kind, jti = %claims.jti, "Token minted");
        Ok(TokenArtifact::from_claims(token, &claims))
    }

    pub(crate) fn build_claims(
        &self,
        kind: TokenKind,
        user_id: &str,
        username: &str,
        role: &str,
        ttl: Duration,
        metadata: Option<Metadata>,
    ) -> Result<Claims, TokenError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::TokenGenerationFailed {
            reason: format!("token lifetime {:?} is out of range", ttl),
        })?;
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::TokenGenerationFailed {
                reason: "token expiry overflows".to_string(),
            })?;

        Ok(Claims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            kind,
            metadata: metadata.filter(|m| !m.is_empty()),
            jti: generate_jti(&mut OsRng, self.config.jti_fallback)?,
            iss: self.config.issuer.clone(),
            sub: user_id.to_string(),
            aud: vec![self.config.issuer.clone()],
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }
}

/// Generates a token id: 16 random bytes, hex encoded.
///
/// When `rng` fails, `policy` decides between a timestamp id and an error.
pub(crate) fn generate_jti<R: RngCore>(rng: &mut R, policy: JtiFallback) -> Result<String, TokenError> {
    let mut bytes = [0u8; 16];
    match rng.try_fill_bytes(&mut bytes) {
        Ok(()) => Ok(hex::encode(bytes)),
        Err(err) => match policy {
            JtiFallback::Timestamp => {
                warn!(error = %err, "Secure random source failed; falling back to timestamp token id");
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or_default();
                Ok(format!("jti_{}", nanos))
            }
            JtiFallback::Reject => Err(TokenError::TokenGenerationFailed {
                reason: format!("secure random source failed: {}", err),
            }),
        },
    }
}
