//! Authentication: who is signed in and how they got there.
//!
//! This module provides:
//! - `Role`, `RoleSet`: normalized role tags and their matching helpers
//! - `SessionState`: the in-memory session, written through to storage
//! - `AuthService`: login, signup and logout against an `AuthBackend`
//! - `CredentialStore`: optional OS keychain storage for "remember me"
//!
//! `AuthService` is the single writer of the session; views read a
//! `Session` snapshot.

pub mod credentials;
pub mod role;
pub mod service;
pub mod session;

pub use credentials::CredentialStore;
pub use role::{Role, RoleSet, ADMIN, USER};
pub use service::{validate_login, validate_signup, AuthBackend, AuthError, AuthService, Redirect};
pub use session::{Identity, Session, SessionState};
