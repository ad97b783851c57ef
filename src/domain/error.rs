//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Rejection reasons for a transfer attempt and related domain failures.
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer, and each
/// reason is surfaced verbatim to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Amount is zero, negative, or exceeds the representable ceiling
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No account is registered under the recipient's public identifier
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),

    /// Source and destination resolve to the same account
    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    /// Submitted quantum key did not authorize the transfer
    #[error("Credential invalid: {0}")]
    CredentialInvalid(CredentialFault),

    /// Insufficient balance for the debit
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// No account exists for the given identity
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// An account already exists for this identity or public identifier
    #[error("Account already exists: {0}")]
    AccountExists(String),
}

/// Why a credential failed validate-and-consume.
///
/// Subsumed under `credential_invalid` on the wire, but the sub-reason is
/// carried in the response details so the client can tell a stale key from
/// a replayed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialFault {
    /// No credential has been issued for this identity
    #[error("none-issued")]
    NoneIssued,

    /// Submitted token does not match the live credential
    #[error("mismatched")]
    Mismatched,

    /// Credential was already consumed or revoked
    #[error("already-consumed")]
    AlreadyConsumed,

    /// Credential lifetime has elapsed
    #[error("expired")]
    Expired,
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Check if this is a client error (caller's fault, never retried)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::UnknownRecipient(_)
                | Self::SelfTransfer
                | Self::CredentialInvalid(_)
                | Self::InsufficientFunds { .. }
                | Self::AccountExists(_)
        )
    }
}

impl From<CredentialFault> for DomainError {
    fn from(fault: CredentialFault) -> Self {
        Self::CredentialInvalid(fault)
    }
}
