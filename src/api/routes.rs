//! API Routes
//!
//! HTTP endpoint definitions. Amounts cross the wire as minor-unit
//! integers; decimal formatting is the client's concern.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, HistoryEntry, OperationContext};
use crate::error::AppError;
use crate::handlers::{
    OpenAccountCommand, OpenAccountHandler, TransferAuthorizer, TransferCommand,
};
use crate::history::HistoryReconciler;
use crate::state::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAccountRequest {
    pub identity_id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAccountResponse {
    pub identity_id: Uuid,
    pub account_id: Uuid,
    pub email: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionKeyRequest {
    pub identity: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionKeyResponse {
    pub quantum_key: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteKeyRequest {
    pub identity: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_identity: Uuid,
    pub to_email: String,
    /// Minor units
    pub amount: i64,
    pub quantum_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub transfer_id: u64,
    pub new_balance: i64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub identity: Uuid,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub identity: Uuid,
    pub entries: Vec<HistoryEntry>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Account opening (post-signup registration)
        .route("/accounts", post(open_account))
        // Reads
        .route("/accounts/:identity_id/balance", get(get_balance))
        .route("/accounts/:identity_id/history", get(get_history))
        // Session credential lifecycle
        .route("/session-key", post(issue_session_key))
        .route("/delete-key", post(delete_session_key))
        // Transfers
        .route("/transfer", post(transfer))
}

/// Require the provider-verified assertion to cover `identity`.
fn require_assertion(context: &OperationContext, identity: Uuid) -> Result<(), AppError> {
    match context.request_identity {
        Some(asserted) if asserted == identity => Ok(()),
        Some(_) => Err(AppError::IdentityMismatch),
        None => Err(AppError::MissingHeader("X-Identity-Id".to_string())),
    }
}

// =========================================================================
// POST /accounts
// =========================================================================

/// Open an account for an authenticated identity
async fn open_account(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<OpenAccountRequest>,
) -> Result<(StatusCode, Json<OpenAccountResponse>), AppError> {
    let handler = OpenAccountHandler::new(&state);

    let command = OpenAccountCommand::new(request.identity_id, request.username, request.email);
    let command = if let Some(phone) = request.phone {
        command.with_phone(phone)
    } else {
        command
    };

    let result = handler.execute(command, &context).await?;

    Ok((
        StatusCode::CREATED,
        Json(OpenAccountResponse {
            identity_id: result.identity_id,
            account_id: result.account_id,
            email: result.email,
            balance: result.balance,
        }),
    ))
}

// =========================================================================
// POST /session-key
// =========================================================================

/// Issue a fresh quantum key, superseding any prior live one
async fn issue_session_key(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<SessionKeyRequest>,
) -> Result<Json<SessionKeyResponse>, AppError> {
    require_assertion(&context, request.identity)?;

    // Only registered identities get credentials
    if state.directory.by_identity(request.identity).await.is_none() {
        return Err(DomainError::AccountNotFound(request.identity.to_string()).into());
    }

    let issued = state.sessions.issue(request.identity).await;

    Ok(Json(SessionKeyResponse {
        quantum_key: issued.token,
        expires_at: issued.expires_at,
    }))
}

// =========================================================================
// POST /delete-key
// =========================================================================

/// Revoke the live quantum key. Idempotent: 204 whether or not one existed
async fn delete_session_key(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<DeleteKeyRequest>,
) -> Result<StatusCode, AppError> {
    require_assertion(&context, request.identity)?;

    state.sessions.revoke(request.identity).await;

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// POST /transfer
// =========================================================================

/// Transfer funds, consuming the submitted quantum key
async fn transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let authorizer = TransferAuthorizer::new(&state);

    let command = TransferCommand::new(
        request.from_identity,
        request.to_email,
        request.amount,
        request.quantum_key,
    );

    let receipt = authorizer.execute(command, &context).await?;

    Ok(Json(TransferResponse {
        transfer_id: receipt.transfer_id,
        new_balance: receipt.new_balance,
        status: receipt.status,
    }))
}

// =========================================================================
// GET /accounts/:identity_id/balance
// =========================================================================

/// Read the current balance
async fn get_balance(
    State(state): State<AppState>,
    Path(identity_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, AppError> {
    let account = state
        .directory
        .by_identity(identity_id)
        .await
        .ok_or_else(|| DomainError::AccountNotFound(identity_id.to_string()))?;

    Ok(Json(BalanceResponse {
        identity: identity_id,
        balance: account.balance().await.value(),
    }))
}

// =========================================================================
// GET /accounts/:identity_id/history
// =========================================================================

/// Reconciled transfer history, newest first
async fn get_history(
    State(state): State<AppState>,
    Path(identity_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let account = state
        .directory
        .by_identity(identity_id)
        .await
        .ok_or_else(|| DomainError::AccountNotFound(identity_id.to_string()))?;

    let reconciler = HistoryReconciler::new(&state);
    let entries = reconciler.history_for(account.id()).await;

    Ok(Json(HistoryResponse {
        identity: identity_id,
        entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_request_deserialize() {
        let json = r#"{
            "from_identity": "550e8400-e29b-41d4-a716-446655440001",
            "to_email": "bob@example.com",
            "amount": 2500,
            "quantum_key": "deadbeef"
        }"#;

        let request: TransferRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.amount, 2500);
        assert_eq!(request.to_email, "bob@example.com");
    }

    #[test]
    fn test_open_account_request_deserialize() {
        let json = r#"{
            "identity_id": "550e8400-e29b-41d4-a716-446655440000",
            "username": "alice",
            "email": "alice@example.com"
        }"#;

        let request: OpenAccountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.username, "alice");
        assert!(request.phone.is_none());
    }

    #[test]
    fn test_fractional_amount_rejected_at_the_boundary() {
        // Minor-unit integers only on the wire
        let json = r#"{
            "from_identity": "550e8400-e29b-41d4-a716-446655440001",
            "to_email": "bob@example.com",
            "amount": 25.5,
            "quantum_key": "deadbeef"
        }"#;

        let request: Result<TransferRequest, _> = serde_json::from_str(json);
        assert!(request.is_err());
    }
}
