//! Account Directory
//!
//! Maps public identifiers (email) and identities to accounts, and owns
//! every account balance. Balances are mutated only by the transfer
//! authorizer, through per-account locks taken in fixed id order.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

use crate::domain::{Balance, DomainError};

/// One account per identity.
///
/// Metadata is immutable after opening; the balance lives behind its own
/// mutex so independent account pairs never contend.
#[derive(Debug)]
pub struct Account {
    id: Uuid,
    identity_id: Uuid,
    username: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    balance: Mutex<Balance>,
}

impl Account {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity_id(&self) -> Uuid {
        self.identity_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Public identifier used by counterparties to address this account.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Read the current balance.
    pub async fn balance(&self) -> Balance {
        *self.balance.lock().await
    }

    /// Take the balance lock. The transfer authorizer acquires both
    /// parties' locks in ascending account-id order before mutating.
    pub(crate) async fn lock_balance(&self) -> MutexGuard<'_, Balance> {
        self.balance.lock().await
    }
}

#[derive(Debug, Default)]
struct DirectoryIndex {
    by_account: HashMap<Uuid, Arc<Account>>,
    by_identity: HashMap<Uuid, Uuid>,
    by_email: HashMap<String, Uuid>,
}

/// In-memory account registry with email and identity indexes.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    index: RwLock<DirectoryIndex>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account for an identity with the given opening balance.
    ///
    /// Enforces one account per identity and a globally unique email.
    pub async fn open_account(
        &self,
        identity_id: Uuid,
        username: String,
        email: String,
        phone: Option<String>,
        opening_balance: Balance,
    ) -> Result<Arc<Account>, DomainError> {
        let email = normalize_email(&email);

        let mut index = self.index.write().await;

        if index.by_identity.contains_key(&identity_id) {
            return Err(DomainError::AccountExists(identity_id.to_string()));
        }
        if index.by_email.contains_key(&email) {
            return Err(DomainError::AccountExists(email));
        }

        let account = Arc::new(Account {
            id: Uuid::new_v4(),
            identity_id,
            username,
            email: email.clone(),
            phone,
            created_at: Utc::now(),
            balance: Mutex::new(opening_balance),
        });

        index.by_identity.insert(identity_id, account.id);
        index.by_email.insert(email, account.id);
        index.by_account.insert(account.id, Arc::clone(&account));

        tracing::info!(
            account = %account.id,
            identity = %identity_id,
            "Opened account"
        );

        Ok(account)
    }

    /// Resolve a public identifier to an account.
    pub async fn resolve(&self, email: &str) -> Option<Arc<Account>> {
        let email = normalize_email(email);
        let index = self.index.read().await;
        let account_id = index.by_email.get(&email)?;
        index.by_account.get(account_id).map(Arc::clone)
    }

    /// Look up the account owned by an identity.
    pub async fn by_identity(&self, identity_id: Uuid) -> Option<Arc<Account>> {
        let index = self.index.read().await;
        let account_id = index.by_identity.get(&identity_id)?;
        index.by_account.get(account_id).map(Arc::clone)
    }

    /// Look up an account by its internal id.
    pub async fn by_account_id(&self, account_id: Uuid) -> Option<Arc<Account>> {
        self.index
            .read()
            .await
            .by_account
            .get(&account_id)
            .map(Arc::clone)
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.by_account.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.by_account.is_empty()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
