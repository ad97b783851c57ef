//! Ledger
//!
//! Append-only store of completed transfers, dual-indexed by source and
//! destination account. Records are immutable once written; there is no
//! update or delete. Ordering for display is the reconciler's job — the
//! role queries return storage order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Amount, TransferRecord};

#[derive(Debug)]
struct LedgerInner {
    records: Vec<TransferRecord>,
    by_source: HashMap<Uuid, Vec<usize>>,
    by_destination: HashMap<Uuid, Vec<usize>>,
    next_id: u64,
    last_timestamp: DateTime<Utc>,
}

impl Default for LedgerInner {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            by_source: HashMap::new(),
            by_destination: HashMap::new(),
            next_id: 1,
            last_timestamp: DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// Append-only, dual-indexed transfer record store.
#[derive(Debug, Default)]
pub struct Ledger {
    inner: RwLock<LedgerInner>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed transfer.
    ///
    /// Assigns the next monotonic identifier and a server timestamp
    /// clamped to be non-decreasing, so (timestamp, id) totally orders the
    /// ledger even when the wall clock stalls or steps backwards.
    pub async fn append(
        &self,
        from_account: Uuid,
        to_account: Uuid,
        amount: Amount,
    ) -> TransferRecord {
        let mut inner = self.inner.write().await;

        let timestamp = Utc::now().max(inner.last_timestamp);
        let record = TransferRecord {
            id: inner.next_id,
            from_account,
            to_account,
            amount,
            timestamp,
        };

        let position = inner.records.len();
        inner.by_source.entry(from_account).or_default().push(position);
        inner
            .by_destination
            .entry(to_account)
            .or_default()
            .push(position);
        inner.records.push(record.clone());
        inner.next_id += 1;
        inner.last_timestamp = timestamp;

        tracing::debug!(
            record = record.id,
            from = %from_account,
            to = %to_account,
            amount = %amount,
            "Appended transfer record"
        );

        record
    }

    /// All records where the account is the source, in storage order.
    pub async fn query_sent(&self, account_id: Uuid) -> Vec<TransferRecord> {
        let inner = self.inner.read().await;
        Self::collect(&inner, inner.by_source.get(&account_id))
    }

    /// All records where the account is the destination, in storage order.
    pub async fn query_received(&self, account_id: Uuid) -> Vec<TransferRecord> {
        let inner = self.inner.read().await;
        Self::collect(&inner, inner.by_destination.get(&account_id))
    }

    /// Total number of records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    fn collect(inner: &LedgerInner, positions: Option<&Vec<usize>>) -> Vec<TransferRecord> {
        positions
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| inner.records[position].clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(value: i64) -> Amount {
        Amount::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_append_assigns_monotonic_ids() {
        let ledger = Ledger::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = ledger.append(a, b, amount(100)).await;
        let second = ledger.append(b, a, amount(50)).await;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(ledger.len().await, 2);
    }

    #[tokio::test]
    async fn test_role_queries_are_independent() {
        let ledger = Ledger::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        ledger.append(a, b, amount(100)).await;
        ledger.append(b, a, amount(25)).await;
        ledger.append(a, c, amount(75)).await;

        let sent = ledger.query_sent(a).await;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|record| record.from_account == a));

        let received = ledger.query_received(a).await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].from_account, b);

        // An uninvolved account sees nothing
        assert!(ledger.query_sent(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn test_queries_return_storage_order() {
        let ledger = Ledger::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        for value in [10, 20, 30] {
            ledger.append(a, b, amount(value)).await;
        }

        let sent = ledger.query_sent(a).await;
        let ids: Vec<u64> = sent.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_ledger() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty().await);
        assert!(ledger.query_sent(Uuid::new_v4()).await.is_empty());
        assert!(ledger.query_received(Uuid::new_v4()).await.is_empty());
    }
}
