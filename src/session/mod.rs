//! Session module
//!
//! Credential storage and the authority that issues, revokes, and consumes
//! quantum keys.

pub mod authority;
pub mod store;

pub use authority::{IssuedCredential, SessionAuthority};
pub use store::CredentialStore;
