//! Transfer Authorizer
//!
//! The per-attempt state machine: received → validated → applied →
//! completed, with a short-circuit to rejected from any state before
//! applied. Validation order is part of the contract — amount first, then
//! recipient, then self-transfer, and only then the credential check, so a
//! malformed request never costs the caller their quantum key.

use std::sync::Arc;

use crate::directory::AccountDirectory;
use crate::domain::{Amount, DomainError, OperationContext};
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::session::SessionAuthority;
use crate::state::AppState;

use super::{TransferCommand, TransferReceipt};

// =========================================================================
// TransferAuthorizer
// =========================================================================

/// Authorizes and applies funds transfers
#[derive(Clone)]
pub struct TransferAuthorizer {
    sessions: Arc<SessionAuthority>,
    directory: Arc<AccountDirectory>,
    ledger: Arc<Ledger>,
}

impl TransferAuthorizer {
    pub fn new(state: &AppState) -> Self {
        Self {
            sessions: Arc::clone(&state.sessions),
            directory: Arc::clone(&state.directory),
            ledger: Arc::clone(&state.ledger),
        }
    }

    /// Execute the transfer command.
    ///
    /// The applied step is a single atomic unit: both balance locks are
    /// held, in ascending account-id order, across the debit, the credit,
    /// and the ledger append. No observer can see a debit without the
    /// matching credit or record.
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferReceipt, AppError> {
        // Authorization check: the provider-verified assertion must cover
        // the identity being debited
        match context.request_identity {
            Some(identity) if identity == command.from_identity => {}
            Some(_) => return Err(AppError::IdentityMismatch),
            None => return Err(AppError::MissingHeader("X-Identity-Id".to_string())),
        }

        // validated: amount precedes every other check
        let amount = Amount::new(command.amount)
            .map_err(|e| DomainError::InvalidAmount(e.to_string()))?;

        let source = self
            .directory
            .by_identity(command.from_identity)
            .await
            .ok_or_else(|| DomainError::AccountNotFound(command.from_identity.to_string()))?;

        let destination = self
            .directory
            .resolve(&command.to_email)
            .await
            .ok_or_else(|| DomainError::UnknownRecipient(command.to_email.clone()))?;

        if destination.id() == source.id() {
            return Err(DomainError::SelfTransfer.into());
        }

        // The credential check is the authorization boundary; passing it
        // consumes the key whatever happens after
        self.sessions
            .validate_and_consume(command.from_identity, &command.quantum_key)
            .await
            .map_err(DomainError::CredentialInvalid)?;

        tracing::debug!(
            from = %source.id(),
            to = %destination.id(),
            amount = %amount,
            "Transfer validated"
        );

        // applied: both locks in ascending account-id order so opposing
        // transfers over the same pair cannot deadlock
        let source_first = source.id() < destination.id();
        let (first, second) = if source_first {
            (&source, &destination)
        } else {
            (&destination, &source)
        };

        let mut first_guard = first.lock_balance().await;
        let mut second_guard = second.lock_balance().await;
        let (source_balance, destination_balance) = if source_first {
            (&mut first_guard, &mut second_guard)
        } else {
            (&mut second_guard, &mut first_guard)
        };

        if !source_balance.is_sufficient_for(&amount) {
            return Err(DomainError::insufficient_funds(
                amount.value(),
                source_balance.value(),
            )
            .into());
        }

        // Compute both sides before committing either
        let debited = source_balance
            .debit(&amount)
            .map_err(|e| AppError::Internal(format!("debit after sufficiency check: {}", e)))?;
        let credited = destination_balance
            .credit(&amount)
            .map_err(|_| DomainError::InvalidAmount("credit exceeds balance ceiling".into()))?;

        **source_balance = debited;
        **destination_balance = credited;

        let record = self
            .ledger
            .append(source.id(), destination.id(), amount)
            .await;

        drop(second_guard);
        drop(first_guard);

        // completed
        tracing::info!(
            transfer = record.id,
            from = %source.id(),
            to = %destination.id(),
            amount = %amount,
            correlation_id = ?context.correlation_id,
            "Transfer completed"
        );

        Ok(TransferReceipt {
            transfer_id: record.id,
            new_balance: debited.value(),
            status: "completed".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_transfer_command() {
        let cmd = TransferCommand::new(
            Uuid::new_v4(),
            "bob@example.com".to_string(),
            2500,
            "a".repeat(64),
        );

        assert_eq!(cmd.amount, 2500);
        assert_eq!(cmd.to_email, "bob@example.com");
    }
}
