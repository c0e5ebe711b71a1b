//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Access/refresh token minting (HS256)
//! - Signature and claim verification
//! - Refresh token rotation with single-use enforcement
//! - Background sweeping of expired revocation entries

mod cleanup;
mod config;
mod issuer;
mod rotation;
mod service;
mod validator;

#[cfg(test)]
mod tests;

pub use cleanup::CleanupScheduler;
pub use config::{AutherConfig, JtiFallback};
pub use issuer::TokenIssuer;
pub use rotation::RotationController;
pub use service::AutherService;
pub use validator::{peek_claims, TokenValidator};
