//! In-memory revocation registry

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::revocation::{fingerprint, RevocationEntry};
use crate::errors::DomainError;

use super::r#trait::RevocationRegistry;

/// Revocation registry backed by a map behind a single reader/writer lock.
///
/// Lookups share the read lock; `revoke` and `sweep` take it exclusively.
/// Memory is bounded by the number of revoked tokens that have not expired
/// yet, provided `sweep` runs periodically.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRegistry {
    entries: RwLock<HashMap<String, RevocationEntry>>,
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for a raw token, expired or not
    pub async fn entry(&self, token: &str) -> Option<RevocationEntry> {
        let entries = self.entries.read().await;
        entries.get(&fingerprint(token)).cloned()
    }
}

#[async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    async fn revoke(
        &self,
        token: &str,
        owner_user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let entry = RevocationEntry::new(token, owner_user_id, expires_at);
        debug!(
            fingerprint = &entry.fingerprint[..12],
            user_id = owner_user_id,
            %expires_at,
            "Token revoked"
        );

        let mut entries = self.entries.write().await;
        entries.insert(entry.fingerprint.clone(), entry);
        Ok(())
    }

    async fn try_revoke(
        &self,
        token: &str,
        owner_user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let entry = RevocationEntry::new(token, owner_user_id, expires_at);

        let mut entries = self.entries.write().await;
        let already_revoked = entries
            .get(&entry.fingerprint)
            .is_some_and(|existing| !existing.is_expired_at(Utc::now()));
        if already_revoked {
            return Ok(false);
        }

        debug!(
            fingerprint = &entry.fingerprint[..12],
            user_id = owner_user_id,
            %expires_at,
            "Token revoked"
        );
        entries.insert(entry.fingerprint.clone(), entry);
        Ok(true)
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&fingerprint(token))
            .is_some_and(|entry| !entry.is_expired_at(Utc::now())))
    }

    async fn sweep(&self) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired_at(now));

        Ok(before - entries.len())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        Ok(self.entries.read().await.len())
    }
}
