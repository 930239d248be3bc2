//! Data models for the Tournamate backend.
//!
//! - `LoginRequest`, `SignupRequest`, `RegistrationRequest`, `AuthPayload`:
//!   identity service requests and responses
//! - `Tournament`, `Team`, `PointsTableRow`, `AddMatchResultRequest`:
//!   tournament manager data

pub mod auth;
pub mod tournament;

pub use auth::{AuthPayload, LoginRequest, RegistrationRequest, SignupRequest};
pub use tournament::{
    AddMatchResultRequest, MatchResultStatus, PointsTable, PointsTableRow, Team, Tournament,
};
