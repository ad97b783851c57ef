//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// OpenAccountCommand
// =========================================================================

/// Command to open an account for an externally authenticated identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccountCommand {
    /// Identity issued by the external provider
    pub identity_id: Uuid,
    pub username: String,
    /// Public identifier other users transfer to
    pub email: String,
    pub phone: Option<String>,
}

impl OpenAccountCommand {
    pub fn new(identity_id: Uuid, username: String, email: String) -> Self {
        Self {
            identity_id,
            username,
            email,
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: String) -> Self {
        self.phone = Some(phone);
        self
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to transfer funds, authorized by a quantum key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    /// Identity of the sender (resolved to an account internally)
    pub from_identity: Uuid,
    /// Public identifier of the recipient
    pub to_email: String,
    /// Amount in minor units (validated by the authorizer)
    pub amount: i64,
    /// Single-use session credential
    pub quantum_key: String,
}

impl TransferCommand {
    pub fn new(from_identity: Uuid, to_email: String, amount: i64, quantum_key: String) -> Self {
        Self {
            from_identity,
            to_email,
            amount,
            quantum_key,
        }
    }
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: u64,
    /// Source balance after the debit, in minor units
    pub new_balance: i64,
    pub status: String,
}

/// Result of a successful account opening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccountResult {
    pub identity_id: Uuid,
    pub account_id: Uuid,
    pub email: String,
    /// Opening balance in minor units
    pub balance: i64,
}
