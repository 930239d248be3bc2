//! Tourni core library.
//!
//! Shared logic for the tourni client: the persisted session store,
//! sign-in/sign-up/sign-out against the Tournamate backend, role-based
//! route guards and the typed API client for tournaments, teams, points
//! tables and match results.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthService, Session};
pub use config::Config;
pub use nav::{can_access, guard, Route};
pub use storage::{FileStorage, PersistedStore};
