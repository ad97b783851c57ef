//! Session Authority
//!
//! Issues and revokes quantum keys. Every check-and-consume is atomic per
//! identity: the slot mutex is held across the whole decision, so two
//! transfers racing the same key see exactly one success.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{CredentialFault, SessionCredential};

use super::store::CredentialStore;

/// Result of issuing a credential. The token plaintext exists only here
/// and in the response body; the store keeps the digest.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues, revokes, and consumes session credentials.
#[derive(Debug)]
pub struct SessionAuthority {
    store: CredentialStore,
    ttl: Duration,
}

impl SessionAuthority {
    /// Create an authority issuing credentials with the given lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: CredentialStore::new(),
            ttl,
        }
    }

    /// Issue a fresh credential for an identity.
    ///
    /// Supersession, not accumulation: any prior live credential for the
    /// identity is invalidated by the replacement. Safe to call on every
    /// login; the caller must have verified the identity assertion first.
    pub async fn issue(&self, identity_id: Uuid) -> IssuedCredential {
        let slot = self.store.slot(identity_id).await;
        let mut slot = slot.lock().await;

        if let Some(prior) = &slot.credential {
            if prior.is_live(Utc::now()) {
                tracing::debug!(identity = %identity_id, "Superseding live credential");
            }
        }

        let (credential, token) = SessionCredential::mint(identity_id, self.ttl);
        let expires_at = credential.expires_at();
        slot.credential = Some(credential);

        tracing::info!(identity = %identity_id, %expires_at, "Issued session credential");

        IssuedCredential { token, expires_at }
    }

    /// Mark the identity's live credential, if any, as consumed.
    ///
    /// Idempotent: revoking with no live credential is a no-op. Returns
    /// whether a live credential was revoked.
    pub async fn revoke(&self, identity_id: Uuid) -> bool {
        let slot = self.store.slot(identity_id).await;
        let mut slot = slot.lock().await;

        match slot.credential.as_mut() {
            Some(credential) if credential.is_live(Utc::now()) => {
                credential.consume();
                tracing::info!(identity = %identity_id, "Revoked session credential");
                true
            }
            _ => false,
        }
    }

    /// Atomically check a submitted token and consume the credential.
    ///
    /// Exactly one of two concurrent callers with the same valid token
    /// succeeds; the loser sees `AlreadyConsumed`. A mismatched or expired
    /// token leaves the stored credential untouched.
    pub async fn validate_and_consume(
        &self,
        identity_id: Uuid,
        token: &str,
    ) -> Result<(), CredentialFault> {
        let slot = self.store.slot(identity_id).await;
        let mut slot = slot.lock().await;

        let credential = slot
            .credential
            .as_mut()
            .ok_or(CredentialFault::NoneIssued)?;

        // Mismatch is checked before the consumed flag: only a token that
        // matches the stored digest may learn it lost a race.
        if !credential.matches(token) {
            return Err(CredentialFault::Mismatched);
        }

        if credential.is_consumed() {
            return Err(CredentialFault::AlreadyConsumed);
        }

        if credential.is_expired(Utc::now()) {
            return Err(CredentialFault::Expired);
        }

        credential.consume();
        tracing::debug!(identity = %identity_id, "Consumed session credential");

        Ok(())
    }

    /// The underlying store, for maintenance jobs.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }
}
