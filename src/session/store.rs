//! Credential Store
//!
//! Holds the current session credential per identity. Pure state: each
//! identity gets a slot behind its own mutex, so issuance and consumption
//! for one identity serialize without blocking other identities.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::SessionCredential;

/// Per-identity credential slot.
///
/// All reads and writes of the credential go through the slot's mutex.
#[derive(Debug, Default)]
pub struct CredentialSlot {
    pub credential: Option<SessionCredential>,
}

/// In-memory credential storage, keyed by identity.
///
/// Slots are created on first touch and live for the identity's lifetime;
/// the sweep clears dead credentials but keeps the slot, so a consumed
/// credential can never resurface under a stale `Arc`.
#[derive(Debug, Default)]
pub struct CredentialStore {
    slots: RwLock<HashMap<Uuid, Arc<Mutex<CredentialSlot>>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the slot for an identity.
    pub async fn slot(&self, identity_id: Uuid) -> Arc<Mutex<CredentialSlot>> {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(&identity_id) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(identity_id).or_default())
    }

    /// Clear credentials that can never validate again (consumed or
    /// expired). Storage hygiene only; correctness relies on the lazy
    /// expiry check at validation time.
    pub async fn sweep_dead(&self, now: DateTime<Utc>) -> usize {
        let slots: Vec<Arc<Mutex<CredentialSlot>>> = {
            let map = self.slots.read().await;
            map.values().map(Arc::clone).collect()
        };

        let mut cleared = 0;
        for slot in slots {
            let mut slot = slot.lock().await;
            if let Some(credential) = &slot.credential {
                if !credential.is_live(now) {
                    slot.credential = None;
                    cleared += 1;
                }
            }
        }

        cleared
    }

    /// Number of identities with a slot (live or not).
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_slot_created_on_first_touch() {
        let store = CredentialStore::new();
        assert!(store.is_empty().await);

        let identity = Uuid::new_v4();
        let slot = store.slot(identity).await;
        assert!(slot.lock().await.credential.is_none());
        assert_eq!(store.len().await, 1);

        // Same identity returns the same slot
        let again = store.slot(identity).await;
        assert!(Arc::ptr_eq(&slot, &again));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_clears_expired_and_consumed() {
        let store = CredentialStore::new();

        // Expired credential
        let expired_identity = Uuid::new_v4();
        let (expired, _) = SessionCredential::mint(expired_identity, Duration::zero());
        store.slot(expired_identity).await.lock().await.credential = Some(expired);

        // Consumed credential
        let consumed_identity = Uuid::new_v4();
        let (mut consumed, _) = SessionCredential::mint(consumed_identity, Duration::minutes(15));
        consumed.consume();
        store.slot(consumed_identity).await.lock().await.credential = Some(consumed);

        // Live credential
        let live_identity = Uuid::new_v4();
        let (live, _) = SessionCredential::mint(live_identity, Duration::minutes(15));
        store.slot(live_identity).await.lock().await.credential = Some(live);

        let now = Utc::now();
        let cleared = store.sweep_dead(now).await;
        assert_eq!(cleared, 2);

        // Slots persist, only dead credentials are gone
        assert_eq!(store.len().await, 3);
        assert!(store
            .slot(live_identity)
            .await
            .lock()
            .await
            .credential
            .is_some());
        assert!(store
            .slot(expired_identity)
            .await
            .lock()
            .await
            .credential
            .is_none());
    }

    #[tokio::test]
    async fn test_sweep_on_empty_store() {
        let store = CredentialStore::new();
        assert_eq!(store.sweep_dead(Utc::now()).await, 0);
    }
}
