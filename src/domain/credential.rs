//! Session Credentials
//!
//! The quantum key: a short-lived, single-purpose authorization token
//! scoping one transfer to one authenticated identity. The plaintext token
//! is returned to the client exactly once at issuance; the store keeps only
//! its SHA-256 digest, so a leaked store cannot replay keys.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Token entropy in bytes (256 bits).
const TOKEN_BYTES: usize = 32;

/// A session credential bound to one identity.
///
/// At most one live (unconsumed, unexpired) credential exists per identity;
/// issuing a new one supersedes the prior. The consumed flag is
/// irreversible.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    identity_id: Uuid,
    token_digest: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    consumed: bool,
}

impl SessionCredential {
    /// Mint a fresh credential for an identity.
    ///
    /// Returns the credential and the plaintext token. The plaintext is not
    /// retained anywhere after this call.
    pub fn mint(identity_id: Uuid, ttl: Duration) -> (Self, String) {
        let token = generate_token();
        let now = Utc::now();

        let credential = Self {
            identity_id,
            token_digest: digest_token(&token),
            issued_at: now,
            expires_at: now + ttl,
            consumed: false,
        };

        (credential, token)
    }

    pub fn identity_id(&self) -> Uuid {
        self.identity_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Compare a submitted plaintext token against the stored digest.
    pub fn matches(&self, token: &str) -> bool {
        self.token_digest == digest_token(token)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Live means unconsumed and unexpired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now)
    }

    /// Mark the credential consumed. Irreversible.
    pub fn consume(&mut self) {
        self.consumed = true;
    }
}

/// Generate a high-entropy token, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest of a plaintext token, hex-encoded.
fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
