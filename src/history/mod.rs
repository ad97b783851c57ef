//! History Reconciler
//!
//! Read-only derived view over the ledger: merges the two role-indexed
//! queries into one chronological, counterparty-labeled sequence. Never a
//! store of truth.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::directory::AccountDirectory;
use crate::domain::{Direction, HistoryEntry, TransferRecord};
use crate::ledger::Ledger;
use crate::state::AppState;

/// Label for counterparties the directory cannot resolve. Accounts are
/// never deleted in this core, so hitting it means a ledger/directory
/// inconsistency; one bad record must not fail the whole page.
const UNKNOWN_COUNTERPARTY: &str = "unknown";

/// Builds per-account transfer history from the ledger.
#[derive(Clone)]
pub struct HistoryReconciler {
    ledger: Arc<Ledger>,
    directory: Arc<AccountDirectory>,
}

impl HistoryReconciler {
    pub fn new(state: &AppState) -> Self {
        Self {
            ledger: Arc::clone(&state.ledger),
            directory: Arc::clone(&state.directory),
        }
    }

    /// All transfers involving the account, newest first.
    ///
    /// Two role queries are merged and sorted before any counterparty is
    /// resolved, and each distinct counterparty is resolved exactly once
    /// however many records reference it.
    pub async fn history_for(&self, account_id: Uuid) -> Vec<HistoryEntry> {
        let sent = self.ledger.query_sent(account_id).await;
        let received = self.ledger.query_received(account_id).await;

        let mut merged: Vec<(Direction, TransferRecord)> = sent
            .into_iter()
            .map(|record| (Direction::Sent, record))
            .chain(
                received
                    .into_iter()
                    .map(|record| (Direction::Received, record)),
            )
            .collect();

        // Newest first; the monotonic id breaks timestamp ties
        merged.sort_by(|(_, a), (_, b)| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });

        let counterparties: HashSet<Uuid> = merged
            .iter()
            .map(|(_, record)| record.counterparty_of(account_id))
            .collect();

        let mut labels: HashMap<Uuid, String> = HashMap::with_capacity(counterparties.len());
        for counterparty in counterparties {
            let label = match self.directory.by_account_id(counterparty).await {
                Some(account) => account.email().to_string(),
                None => {
                    tracing::warn!(account = %counterparty, "Unresolvable counterparty in ledger");
                    UNKNOWN_COUNTERPARTY.to_string()
                }
            };
            labels.insert(counterparty, label);
        }

        merged
            .into_iter()
            .map(|(direction, record)| {
                let counterparty = record.counterparty_of(account_id);
                HistoryEntry {
                    transfer_id: record.id,
                    direction,
                    counterparty: labels
                        .get(&counterparty)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_COUNTERPARTY.to_string()),
                    amount: record.amount,
                    timestamp: record.timestamp,
                }
            })
            .collect()
    }
}
