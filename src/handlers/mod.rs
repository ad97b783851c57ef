//! Command Handlers module
//!
//! Handlers orchestrate the session authority, account directory, and
//! ledger to carry out state-changing operations.

mod commands;
mod open_account_handler;
mod transfer_handler;


pub use commands::*;
pub use open_account_handler::OpenAccountHandler;
pub use transfer_handler::TransferAuthorizer;
