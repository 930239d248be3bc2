//! API client for the Tournamate gateway.
//!
//! Both services behind the gateway answer with an `ApiEnvelope`; every call
//! here decodes the envelope and hands back either the payload or an
//! `ApiError`.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::envelope::ApiEnvelope;
use super::ApiError;
use crate::auth::AuthBackend;
use crate::models::{
    AddMatchResultRequest, AuthPayload, LoginRequest, PointsTable, RegistrationRequest, Team,
    Tournament,
};

// ============================================================================
// Constants
// ============================================================================

/// Default gateway address for a local deployment.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Path prefix of the identity service.
const AUTH_PATH: &str = "/api/v1/auth";

/// Path prefix of the tournament manager.
const MANAGER_PATH: &str = "/api/v1/tournimanager";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the gateway.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, prefix: &str, path: &str) -> String {
        format!("{}{}{}", self.base_url, prefix, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Unusable token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send once and decode the envelope. Nothing is retried; a 429 comes
    /// back as `RateLimited` like any other refusal.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let response = request.headers(self.auth_headers()?).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url, "Rate limited");
        }
        envelope_from(status, &body, url)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<ApiEnvelope<T>, ApiError> {
        self.send(self.client.get(url), url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        self.send(self.client.post(url).json(body), url).await
    }

    // ===== Tournament Manager =====

    /// Fetch every tournament
    pub async fn fetch_tournaments(&self) -> Result<Vec<Tournament>, ApiError> {
        let url = self.url(MANAGER_PATH, "/tournaments");
        let tournaments: Vec<Tournament> = self.get(&url).await?.into_result()?;
        debug!(count = tournaments.len(), "Fetched tournaments");
        Ok(tournaments)
    }

    /// Fetch every team
    pub async fn fetch_teams(&self) -> Result<Vec<Team>, ApiError> {
        let url = self.url(MANAGER_PATH, "/teams");
        let teams: Vec<Team> = self.get(&url).await?.into_result()?;
        debug!(count = teams.len(), "Fetched teams");
        Ok(teams)
    }

    /// Fetch the points table for one tournament
    pub async fn fetch_points_table(&self, tournament_id: i64) -> Result<PointsTable, ApiError> {
        let url = self.url(MANAGER_PATH, &format!("/pointstable/tournament/{}", tournament_id));
        let mut table: PointsTable = self.get(&url).await?.into_result()?;
        table.tournament_id.get_or_insert(tournament_id);
        debug!(tournament_id, rows = table.rows.len(), "Fetched points table");
        Ok(table)
    }

    /// Record a match result. Returns the manager's confirmation message.
    pub async fn add_match_result(&self, request: &AddMatchResultRequest) -> Result<String, ApiError> {
        let url = self.url(MANAGER_PATH, "/addMatchResult");
        let message: String = self.post(&url, request).await?.into_result()?;
        debug!(match_number = request.match_number, "Match result saved");
        Ok(message)
    }
}

impl AuthBackend for ApiClient {
    async fn authenticate(&self, request: &LoginRequest) -> Result<ApiEnvelope<AuthPayload>, ApiError> {
        let url = self.url(AUTH_PATH, "/authenticate");
        self.post(&url, request).await
    }

    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<ApiEnvelope<AuthPayload>, ApiError> {
        let url = self.url(AUTH_PATH, "/register");
        self.post(&url, request).await
    }
}

/// Decode a response body into an envelope.
///
/// Error statuses still carry an envelope when the backend's exception
/// handler produced them, so the body is tried as a failure envelope first
/// and the status mapping is the fallback. A success status with a body that
/// is not an envelope is rejected.
fn envelope_from<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    url: &str,
) -> Result<ApiEnvelope<T>, ApiError> {
    if status.is_success() {
        return serde_json::from_str(body).map_err(|e| {
            warn!(url, error = %e, "Response is not a recognised envelope");
            ApiError::InvalidResponse(format!("Unrecognised response from {}: {}", url, e))
        });
    }

    match serde_json::from_str::<ApiEnvelope<T>>(body) {
        Ok(envelope) if !envelope.success => Ok(envelope),
        _ => Err(ApiError::from_status(status, body)),
    }
}
