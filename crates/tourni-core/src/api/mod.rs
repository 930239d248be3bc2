//! REST API client module for the Tournamate gateway.
//!
//! This module provides the `ApiClient` for the identity service (login,
//! registration) and the tournament manager (tournaments, teams, points
//! table, match results).
//!
//! Tournament calls use JWT bearer authentication; the token comes from the
//! signed-in `Session`.

pub mod client;
pub mod envelope;
pub mod error;

pub use client::ApiClient;
pub use envelope::{ApiEnvelope, ErrorDetails};
pub use error::ApiError;
