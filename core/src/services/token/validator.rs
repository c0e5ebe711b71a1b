//! Token verification
//!
//! Validation runs in three stages:
//! 1. revocation lookup (cheap, before any cryptography)
//! 2. signature verification against an HMAC-only allow-list
//! 3. explicit checks of the time window, issuer and audience
//!
//! When stage 2 fails, the payload is decoded *without* verification purely
//! to report a stable error kind. Nothing read on that path is ever returned
//! to the caller as claims.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::token::{Claims, TokenKind, UnverifiedClaims};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::RevocationRegistry;

use super::config::AutherConfig;

/// Algorithms a token header may name
const ALLOWED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Parses, verifies and checks tokens issued under this service's secret
pub struct TokenValidator {
    config: Arc<AutherConfig>,
    decoding_key: DecodingKey,
    validation: Validation,
    registry: Option<Arc<dyn RevocationRegistry>>,
}

impl TokenValidator {
    /// Creates a validator
    ///
    /// # Arguments
    ///
    /// * `registry` - Consulted before every verification; `None` disables
    ///   revocation checks
    pub fn new(config: Arc<AutherConfig>, registry: Option<Arc<dyn RevocationRegistry>>) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        // Signature and algorithm only; time and audience are checked explicitly
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from([
            "exp".to_string(),
            "iss".to_string(),
            "aud".to_string(),
        ]);

        Self {
            config,
            decoding_key,
            validation,
            registry,
        }
    }

    /// Validates a token of either kind
    ///
    /// A successful return means the token carries this service's signature,
    /// is inside its validity window, names the configured issuer and
    /// audience, and was not revoked at the time of the check.
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Verified claims
    /// * `Err(DomainError::Token(..))` - Revoked, expired, or invalid
    /// * `Err(DomainError::Store { .. })` - The revocation store failed
    pub async fn validate(&self, token: &str) -> DomainResult<Claims> {
        if let Some(registry) = &self.registry {
            if registry.is_revoked(token).await? {
                debug!("Rejected revoked token");
                return Err(TokenError::TokenRevoked.into());
            }
        }

        let claims = match self.verify_signature(token) {
            Ok(claims) => claims,
            Err(cause) => return Err(self.classify_unverified(token, cause, Utc::now()).into()),
        };

        self.check_claims(&claims, Utc::now())?;
        Ok(claims)
    }

    /// Validates a token and requires it to be of `expected` kind
    pub async fn validate_kind(&self, token: &str, expected: TokenKind) -> DomainResult<Claims> {
        let claims = self.validate(token).await?;
        if claims.kind != expected {
            return Err(TokenError::WrongTokenType {
                expected,
                actual: claims.kind,
            }
            .into());
        }
        Ok(claims)
    }

    /// Verifies signature and algorithm only
    ///
    /// Time window, issuer and audience are not looked at.
    pub(crate) fn verify_signature(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }

    fn check_claims(&self, claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenError> {
        if claims.is_premature_at(now) {
            return Err(TokenError::TokenNotYetValid);
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::TokenExpired);
        }
        if claims.iss != self.config.issuer {
            return Err(TokenError::invalid_claim("iss"));
        }
        if !claims.has_audience(&self.config.issuer) {
            return Err(TokenError::invalid_claim("aud"));
        }
        Ok(())
    }

    /// Picks the error to report for a token that failed verification.
    ///
    /// Reads untrusted claims; the result only shapes the error and never
    /// authorizes anything.
    fn classify_unverified(&self, token: &str, cause: TokenError, now: DateTime<Utc>) -> TokenError {
        let Ok(claims) = peek_claims(token) else {
            return cause;
        };

        if claims.expires_at().is_some_and(|exp| now > exp) {
            return TokenError::TokenExpired;
        }
        if claims.not_before().is_some_and(|nbf| now < nbf) {
            return TokenError::TokenNotYetValid;
        }
        if let Some(iss) = claims.iss.as_deref() {
            if !iss.is_empty() && iss != self.config.issuer {
                return TokenError::invalid_claim("iss");
            }
        }
        if let Some(aud) = claims.aud.as_deref() {
            if !aud.is_empty() && !aud.iter().any(|a| a == &self.config.issuer) {
                return TokenError::invalid_claim("aud");
            }
        }

        cause
    }
}

/// Decodes a token payload without verifying anything
pub fn peek_claims(token: &str) -> Result<UnverifiedClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::invalid_format("expected three dot-separated segments"));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::invalid_format(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::invalid_format(format!("payload is not a claims object: {}", e)))
}
