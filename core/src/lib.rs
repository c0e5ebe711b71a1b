//! # Auther Core
//!
//! Token authority for session credentials: HS256 access/refresh pairs,
//! verification, a revocation registry with background expiry sweeping,
//! and single-use refresh rotation.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    fingerprint, Claims, Metadata, RevocationEntry, TokenArtifact, TokenKind, TokenPair,
    UnverifiedClaims,
};
pub use errors::{DomainError, DomainResult, TokenError, TokenErrorKind};
pub use repositories::{InMemoryRevocationRegistry, RevocationRegistry};
pub use services::{
    peek_claims, AutherConfig, AutherService, CleanupScheduler, JtiFallback, RotationController,
    TokenIssuer, TokenValidator,
};
