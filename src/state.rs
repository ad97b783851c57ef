//! Application State
//!
//! Shared ownership of the core components. Cloning the state clones the
//! handles, not the stores.

use std::sync::Arc;

use crate::config::Config;
use crate::directory::AccountDirectory;
use crate::domain::Balance;
use crate::ledger::Ledger;
use crate::session::SessionAuthority;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<AccountDirectory>,
    pub ledger: Arc<Ledger>,
    pub sessions: Arc<SessionAuthority>,
    opening_balance: Balance,
}

impl AppState {
    /// Build the state from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            directory: Arc::new(AccountDirectory::new()),
            ledger: Arc::new(Ledger::new()),
            sessions: Arc::new(SessionAuthority::new(config.credential_ttl())),
            opening_balance: config.opening_balance(),
        }
    }

    /// Opening balance granted to newly opened accounts.
    pub fn opening_balance(&self) -> Balance {
        self.opening_balance
    }
}
