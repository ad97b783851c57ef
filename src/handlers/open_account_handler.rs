//! Account Opening Handler
//!
//! Registers an account for an identity the external provider has already
//! authenticated, seeded with the configured opening balance.

use std::sync::Arc;

use crate::directory::AccountDirectory;
use crate::domain::{Balance, OperationContext};
use crate::error::AppError;
use crate::state::AppState;

use super::{OpenAccountCommand, OpenAccountResult};

/// Handler for account opening
#[derive(Clone)]
pub struct OpenAccountHandler {
    directory: Arc<AccountDirectory>,
    opening_balance: Balance,
}

impl OpenAccountHandler {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: Arc::clone(&state.directory),
            opening_balance: state.opening_balance(),
        }
    }

    /// Execute the open-account command
    pub async fn execute(
        &self,
        command: OpenAccountCommand,
        context: &OperationContext,
    ) -> Result<OpenAccountResult, AppError> {
        match context.request_identity {
            Some(identity) if identity == command.identity_id => {}
            Some(_) => return Err(AppError::IdentityMismatch),
            None => return Err(AppError::MissingHeader("X-Identity-Id".to_string())),
        }

        if command.username.trim().is_empty() {
            return Err(AppError::InvalidRequest("username must not be empty".into()));
        }
        if !command.email.contains('@') {
            return Err(AppError::InvalidRequest(
                "email must be a valid public identifier".into(),
            ));
        }

        let account = self
            .directory
            .open_account(
                command.identity_id,
                command.username,
                command.email,
                command.phone,
                self.opening_balance,
            )
            .await?;

        Ok(OpenAccountResult {
            identity_id: account.identity_id(),
            account_id: account.id(),
            email: account.email().to_string(),
            balance: account.balance().await.value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_open_account_command() {
        let cmd = OpenAccountCommand::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "alice@example.com".to_string(),
        )
        .with_phone("555-0100".to_string());

        assert_eq!(cmd.username, "alice");
        assert_eq!(cmd.phone, Some("555-0100".to_string()));
    }
}
