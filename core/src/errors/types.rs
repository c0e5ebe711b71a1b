//! Token-related error types
//!
//! Every variant maps onto one of the stable [`TokenErrorKind`]s so callers
//! can branch on the failure class without matching library error strings.

use thiserror::Error;

use crate::domain::entities::token::TokenKind;

/// Stable classification of token failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorKind {
    /// Malformed, badly signed, disallowed algorithm, wrong issuer/audience, or not yet valid
    Invalid,
    /// The validity window has elapsed
    Expired,
    /// Found in the revocation registry
    Revoked,
    /// A refresh token was used where an access token was required, or vice versa
    WrongTokenType,
    /// Minting could not complete
    Generation,
}

/// Token validation and management failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format: {reason}")]
    InvalidTokenFormat { reason: String },

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Signing algorithm not allowed")]
    AlgorithmNotAllowed,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid token claims: {claim}")]
    InvalidClaims { claim: String },

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType { expected: TokenKind, actual: TokenKind },

    #[error("Token generation failed: {reason}")]
    TokenGenerationFailed { reason: String },
}

impl TokenError {
    /// Classify this error into its stable kind
    pub fn kind(&self) -> TokenErrorKind {
        match self {
            TokenError::TokenExpired => TokenErrorKind::Expired,
            TokenError::TokenRevoked => TokenErrorKind::Revoked,
            TokenError::WrongTokenType { .. } => TokenErrorKind::WrongTokenType,
            TokenError::TokenGenerationFailed { .. } => TokenErrorKind::Generation,
            TokenError::InvalidTokenFormat { .. }
            | TokenError::InvalidSignature
            | TokenError::AlgorithmNotAllowed
            | TokenError::TokenNotYetValid
            | TokenError::InvalidClaims { .. } => TokenErrorKind::Invalid,
        }
    }

    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        TokenError::InvalidTokenFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_claim(claim: impl Into<String>) -> Self {
        TokenError::InvalidClaims {
            claim: claim.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::AlgorithmNotAllowed
            }
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::ImmatureSignature => TokenError::TokenNotYetValid,
            ErrorKind::InvalidIssuer => TokenError::invalid_claim("iss"),
            ErrorKind::InvalidAudience => TokenError::invalid_claim("aud"),
            _ => TokenError::invalid_format(err.to_string()),
        }
    }
}
