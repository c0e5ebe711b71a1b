//! Domain-specific error types and error handling.

mod types;

pub use types::{TokenError, TokenErrorKind};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Revocation store error: {message}")]
    Store { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// The token failure behind this error, if any
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(err) => Some(err),
            _ => None,
        }
    }

    /// Shorthand for the stable kind of a token failure
    pub fn token_kind(&self) -> Option<TokenErrorKind> {
        self.as_token_error().map(TokenError::kind)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
