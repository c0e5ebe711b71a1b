//! Domain entities representing tokens and revocations.

pub mod revocation;
pub mod token;

// Re-export commonly used types
pub use revocation::{fingerprint, RevocationEntry};
pub use token::{
    Claims, Metadata, TokenArtifact, TokenKind, TokenPair, UnverifiedClaims,
};
