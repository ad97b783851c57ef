//! Transfer Records
//!
//! Immutable facts about completed transfers. Records are owned by the
//! ledger and only ever referenced by readers; rejected transfers are never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

/// A completed transfer, as written to the ledger.
///
/// Immutable once written. Records are totally ordered by timestamp with
/// the monotonic id as tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Monotonic record identifier assigned by the ledger
    pub id: u64,

    /// Source account (debited)
    pub from_account: Uuid,

    /// Destination account (credited)
    pub to_account: Uuid,

    /// Transferred amount in minor units
    pub amount: Amount,

    /// Server-assigned timestamp, non-decreasing across records
    pub timestamp: DateTime<Utc>,
}

impl TransferRecord {
    /// The account on the other side of the record from `account`.
    pub fn counterparty_of(&self, account: Uuid) -> Uuid {
        if self.from_account == account {
            self.to_account
        } else {
            self.from_account
        }
    }
}

/// Which side of a transfer an account was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Sent => write!(f, "sent"),
            Direction::Received => write!(f, "received"),
        }
    }
}

/// One row of a user's reconciled transfer history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transfer_id: u64,
    pub direction: Direction,
    /// Public identifier (email) of the other party
    pub counterparty: String,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterparty_of() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let record = TransferRecord {
            id: 1,
            from_account: from,
            to_account: to,
            amount: Amount::new(100).unwrap(),
            timestamp: Utc::now(),
        };

        assert_eq!(record.counterparty_of(from), to);
        assert_eq!(record.counterparty_of(to), from);
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Sent).unwrap(), r#""sent""#);
        assert_eq!(
            serde_json::to_string(&Direction::Received).unwrap(),
            r#""received""#
        );
    }

    #[test]
    fn test_history_entry_serializes_amount_as_integer() {
        let entry = HistoryEntry {
            transfer_id: 7,
            direction: Direction::Received,
            counterparty: "alice@example.com".to_string(),
            amount: Amount::new(2500).unwrap(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["amount"], 2500);
        assert_eq!(json["direction"], "received");
    }
}
