//! Revocation entries keyed by token fingerprint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One revoked token.
///
/// Only the fingerprint of the token is kept, never the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// SHA-256 of the raw token string, hex encoded
    pub fingerprint: String,

    /// Mirrors the token's own `exp`; the entry is meaningless afterwards
    pub expires_at: DateTime<Utc>,

    /// User the revoked token belonged to
    pub owner_user_id: String,

    pub created_at: DateTime<Utc>,
}

impl RevocationEntry {
    /// Creates an entry for `token`, fingerprinting it
    pub fn new(token: &str, owner_user_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint: fingerprint(token),
            expires_at,
            owner_user_id: owner_user_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Checks if the entry has outlived its token at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Fixed-length one-way hash of a raw token string
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
