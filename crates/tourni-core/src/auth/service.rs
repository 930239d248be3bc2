use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::session::{Session, SessionState};
use crate::api::{ApiEnvelope, ApiError};
use crate::models::auth::MIN_PASSWORD_LENGTH;
use crate::models::{AuthPayload, LoginRequest, RegistrationRequest, SignupRequest};
use crate::nav::Route;
use crate::storage::Storage;

/// Message shown when the backend could not be reached or understood.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Unable to reach the server. Please try again later.";

/// Message shown when signup passwords differ.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match";

/// Identity service calls, separated out so auth flows can run against a
/// stub.
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    /// `Err` means no envelope could be obtained (network, status, decode).
    async fn authenticate(&self, request: &LoginRequest) -> Result<ApiEnvelope<AuthPayload>, ApiError>;

    async fn register(&self, request: &RegistrationRequest)
        -> Result<ApiEnvelope<AuthPayload>, ApiError>;
}

/// Why an auth operation failed. `Display` is the text to show the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Caller-correctable input problem; the backend was never called.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a failure envelope.
    #[error("{message}")]
    Api { code: i32, message: String },

    /// No interpretable answer from the backend.
    #[error("{0}")]
    Transport(String),
}

impl AuthError {
    fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { code, message } => AuthError::Api { code, message },
            other => {
                error!(error = %other, "Auth request failed without an envelope");
                AuthError::Transport(TRANSPORT_FAILURE_MESSAGE.to_string())
            }
        }
    }
}

/// Where the front end should go after an auth operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
}

impl Redirect {
    pub fn landing() -> Self {
        Self {
            to: Route::Home,
            replace: false,
        }
    }

    pub fn login() -> Self {
        Self {
            to: Route::Login,
            replace: true,
        }
    }
}

/// Login, signup and logout. The only code path that writes the session.
pub struct AuthService<B: AuthBackend, S: Storage> {
    backend: B,
    state: SessionState<S>,
}

impl<B: AuthBackend, S: Storage> AuthService<B, S> {
    pub fn new(backend: B, state: SessionState<S>) -> Self {
        Self { backend, state }
    }

    pub fn session(&self) -> &Session {
        self.state.session()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &SessionState<S> {
        &self.state
    }

    /// Sign in. Inputs are assumed to be validated by the caller.
    pub async fn login(&mut self, credentials: &LoginRequest) -> Result<Redirect, AuthError> {
        debug!(user = %credentials.username, "Logging in");
        let response = self.backend.authenticate(credentials).await;
        self.finish(response, &credentials.username, "Login")
    }

    /// Register a new account and sign in with it.
    ///
    /// Mismatched passwords fail before any network call.
    pub async fn signup(&mut self, data: &SignupRequest) -> Result<Redirect, AuthError> {
        if !data.passwords_match() {
            return Err(AuthError::Validation(PASSWORD_MISMATCH_MESSAGE.to_string()));
        }
        debug!(user = %data.username, "Registering");
        let response = self.backend.register(&data.to_registration()).await;
        self.finish(response, &data.username, "Signup")
    }

    /// Sign out. Always succeeds, safe to repeat.
    pub fn logout(&mut self) -> Redirect {
        if self.state.session().is_authenticated {
            info!(user = %self.state.session().user_name, "Logged out");
        }
        self.state.reset();
        Redirect::login()
    }

    fn finish(
        &mut self,
        response: Result<ApiEnvelope<AuthPayload>, ApiError>,
        submitted_username: &str,
        operation: &str,
    ) -> Result<Redirect, AuthError> {
        let envelope = response.map_err(AuthError::from_api)?;

        if !envelope.success {
            let details = envelope.error_details_or_unknown();
            warn!(
                operation,
                code = details.error_code,
                message = %details.error_message,
                "Backend rejected request"
            );
            self.state.set_authenticated(false);
            return Err(AuthError::Api {
                code: details.error_code,
                message: details.error_message,
            });
        }

        let identity = envelope
            .data
            .and_then(|payload| payload.into_identity(submitted_username))
            .ok_or_else(|| {
                error!(operation, "Success envelope without a token");
                AuthError::Transport(TRANSPORT_FAILURE_MESSAGE.to_string())
            })?;

        self.state.apply_identity(identity);
        info!(
            operation,
            user = %self.state.session().user_name,
            roles = %self.state.session().roles,
            "Authenticated"
        );
        Ok(Redirect::landing())
    }
}

// ============================================================================
// Form-level checks
// ============================================================================

/// Login form checks: both fields required.
pub fn validate_login(credentials: &LoginRequest) -> Result<(), AuthError> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(AuthError::Validation(
            "Username and password required".to_string(),
        ));
    }
    Ok(())
}

/// Signup form checks, in the order the form reports them.
pub fn validate_signup(data: &SignupRequest) -> Result<(), AuthError> {
    let fail = |msg: &str| -> Result<(), AuthError> { Err(AuthError::Validation(msg.to_string())) };

    if data.first_name.trim().is_empty() {
        return fail("First name is required");
    }
    if data.last_name.trim().is_empty() {
        return fail("Last name is required");
    }
    if data.username.trim().is_empty() {
        return fail("Username is required");
    }
    if data.email.trim().is_empty() {
        return fail("Email is required");
    }
    if !looks_like_email(data.email.trim()) {
        return fail("Invalid email format");
    }
    if data.password.trim().is_empty() {
        return fail("Password is required");
    }
    if data.password.chars().count() < MIN_PASSWORD_LENGTH {
        return fail("Password must be at least 6 characters");
    }
    if !data.passwords_match() {
        return fail(PASSWORD_MISMATCH_MESSAGE);
    }
    Ok(())
}

/// `something@something.something` with no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::auth::session::{AUTHENTICATED_KEY, ROLE_KEY, TOKEN_KEY, USERNAME_KEY};
    use crate::nav::can_access;
    use crate::storage::{MemoryStorage, PersistedStore};

    /// Backend answering every call with a canned JSON body, or failing
    /// like an unreachable server when there is none.
    struct StubBackend {
        reply: Option<String>,
        calls: Cell<usize>,
    }

    impl StubBackend {
        fn replying(json: &str) -> Self {
            Self {
                reply: Some(json.to_string()),
                calls: Cell::new(0),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: None,
                calls: Cell::new(0),
            }
        }

        fn answer(&self) -> Result<ApiEnvelope<AuthPayload>, ApiError> {
            self.calls.set(self.calls.get() + 1);
            match &self.reply {
                Some(json) => serde_json::from_str(json)
                    .map_err(|e| ApiError::InvalidResponse(e.to_string())),
                None => Err(ApiError::ServerError("connection refused".into())),
            }
        }
    }

    impl AuthBackend for StubBackend {
        async fn authenticate(
            &self,
            _request: &LoginRequest,
        ) -> Result<ApiEnvelope<AuthPayload>, ApiError> {
            self.answer()
        }

        async fn register(
            &self,
            _request: &RegistrationRequest,
        ) -> Result<ApiEnvelope<AuthPayload>, ApiError> {
            self.answer()
        }
    }

    const BOB_ADMIN: &str = r#"{"success":true,"data":{"username":"bob","token":"T1","role":"ADMIN"},"errorDetails":null}"#;
    const BAD_CREDENTIALS: &str = r#"{"success":false,"data":null,"errorDetails":{"errorCode":401,"errorMessage":"bad credentials"}}"#;

    fn service(backend: StubBackend) -> AuthService<StubBackend, MemoryStorage> {
        service_with(backend, MemoryStorage::new())
    }

    fn service_with(backend: StubBackend, storage: MemoryStorage) -> AuthService<StubBackend, MemoryStorage> {
        AuthService::new(backend, SessionState::hydrate(PersistedStore::new(storage)))
    }

    fn signup(password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            first_name: "Bob".into(),
            last_name: "Builder".into(),
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn test_login_success_populates_session() {
        let mut auth = service(StubBackend::replying(BOB_ADMIN));
        let redirect = auth.login(&LoginRequest::new("bob", "pw")).await.unwrap();

        assert_eq!(redirect, Redirect::landing());
        let session = auth.session();
        assert!(session.is_authenticated);
        assert_eq!(session.user_name, "bob");
        assert_eq!(session.token, "T1");
        assert_eq!(session.roles.to_vec(), vec!["ADMIN"]);
        assert!(can_access(session, Some("ADMIN")));

        let store = auth.state().store();
        assert_eq!(store.get_string(TOKEN_KEY).as_deref(), Some("T1"));
        assert_eq!(store.get_json::<bool>(AUTHENTICATED_KEY), Some(true));
    }

    #[tokio::test]
    async fn test_login_rejected_surfaces_message() {
        let mut auth = service(StubBackend::replying(BAD_CREDENTIALS));
        let err = auth.login(&LoginRequest::new("bob", "nope")).await.unwrap_err();

        assert_eq!(
            err,
            AuthError::Api {
                code: 401,
                message: "bad credentials".into()
            }
        );
        assert_eq!(err.to_string(), "bad credentials");
        assert!(!auth.session().is_authenticated);
        assert_eq!(auth.state().store().get_string(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_rejected_login_ends_previous_session() {
        let mut storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "OLD").unwrap();
        storage.set_item(AUTHENTICATED_KEY, "true").unwrap();
        let mut auth = service_with(StubBackend::replying(BAD_CREDENTIALS), storage);
        assert!(auth.session().is_authenticated);

        let _ = auth.login(&LoginRequest::new("bob", "nope")).await;
        assert!(!auth.session().is_authenticated);
        assert!(auth.session().token.is_empty());
        assert_eq!(auth.state().store().get_string(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_failure_without_details_uses_unknown_error() {
        let mut auth = service(StubBackend::replying(r#"{"success":false}"#));
        let err = auth.login(&LoginRequest::new("bob", "pw")).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_session_alone() {
        let mut storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "OLD").unwrap();
        storage.set_item(USERNAME_KEY, "alice").unwrap();
        storage.set_item(AUTHENTICATED_KEY, "true").unwrap();
        let mut auth = service_with(StubBackend::unreachable(), storage);

        let err = auth.login(&LoginRequest::new("bob", "pw")).await.unwrap_err();
        assert_eq!(err, AuthError::Transport(TRANSPORT_FAILURE_MESSAGE.into()));
        assert!(auth.session().is_authenticated);
        assert_eq!(auth.session().user_name, "alice");
        assert_eq!(auth.session().token, "OLD");
    }

    #[tokio::test]
    async fn test_success_without_token_is_transport_error() {
        let mut auth = service(StubBackend::replying(r#"{"success":true,"data":{"username":"bob"}}"#));
        let err = auth.login(&LoginRequest::new("bob", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert!(!auth.session().is_authenticated);
    }

    #[tokio::test]
    async fn test_login_legacy_jwt_shape() {
        let mut auth = service(StubBackend::replying(r#"{"isSuccess":true,"data":{"jwt":"J1"}}"#));
        auth.login(&LoginRequest::new("carol", "pw")).await.unwrap();
        assert_eq!(auth.session().token, "J1");
        assert_eq!(auth.session().user_name, "carol");
        assert!(!can_access(auth.session(), Some("ADMIN")));
        assert!(can_access(auth.session(), None));
    }

    #[tokio::test]
    async fn test_signup_password_mismatch_skips_backend() {
        for (a, b) in [("a", "b"), ("secret1", "secret2"), ("pw", "")] {
            let mut auth = service(StubBackend::replying(BOB_ADMIN));
            let err = auth.signup(&signup(a, b)).await.unwrap_err();
            assert_eq!(err, AuthError::Validation(PASSWORD_MISMATCH_MESSAGE.into()));
            assert_eq!(auth.backend().calls.get(), 0);
            assert!(!auth.session().is_authenticated);
        }
    }

    #[tokio::test]
    async fn test_signup_success_signs_in() {
        let reply = r#"{"success":true,"data":{"fullName":"Bob Builder","username":"bob","token":"T2","role":"USER"}}"#;
        let mut auth = service(StubBackend::replying(reply));
        let redirect = auth.signup(&signup("secret1", "secret1")).await.unwrap();

        assert_eq!(redirect, Redirect::landing());
        assert_eq!(auth.backend().calls.get(), 1);
        assert!(auth.session().is_authenticated);
        assert_eq!(auth.session().token, "T2");
        assert!(can_access(auth.session(), Some("user")));
        assert!(!can_access(auth.session(), Some("admin")));
    }

    #[tokio::test]
    async fn test_signup_rejected() {
        let reply = r#"{"success":false,"errorDetails":{"errorCode":409,"errorMessage":"Username already exists"}}"#;
        let mut auth = service(StubBackend::replying(reply));
        let err = auth.signup(&signup("secret1", "secret1")).await.unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");
        assert!(!auth.session().is_authenticated);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let mut auth = service(StubBackend::replying(BOB_ADMIN));
        auth.login(&LoginRequest::new("bob", "pw")).await.unwrap();

        for _ in 0..3 {
            let redirect = auth.logout();
            assert_eq!(redirect, Redirect::login());
            assert!(redirect.replace);
            let session = auth.session();
            assert!(!session.is_authenticated);
            assert!(session.token.is_empty());
            assert!(session.roles.is_empty());
            for key in [TOKEN_KEY, USERNAME_KEY, ROLE_KEY, AUTHENTICATED_KEY] {
                assert_eq!(auth.state().store().get(key), None);
            }
        }
    }

    #[tokio::test]
    async fn test_login_survives_unavailable_storage() {
        let mut auth = service_with(StubBackend::replying(BOB_ADMIN), MemoryStorage::unavailable());
        auth.login(&LoginRequest::new("bob", "pw")).await.unwrap();
        assert!(auth.session().is_authenticated);
        assert!(can_access(auth.session(), Some("ADMIN")));
        assert_eq!(auth.logout(), Redirect::login());
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login(&LoginRequest::new("bob", "pw")).is_ok());
        assert!(validate_login(&LoginRequest::new("  ", "pw")).is_err());
        assert!(validate_login(&LoginRequest::new("bob", "")).is_err());
    }

    #[test]
    fn test_validate_signup_messages() {
        assert!(validate_signup(&signup("secret1", "secret1")).is_ok());

        let mut bad_email = signup("secret1", "secret1");
        bad_email.email = "bob at example".into();
        assert_eq!(
            validate_signup(&bad_email),
            Err(AuthError::Validation("Invalid email format".into()))
        );

        assert_eq!(
            validate_signup(&signup("abc", "abc")),
            Err(AuthError::Validation("Password must be at least 6 characters".into()))
        );
        assert_eq!(
            validate_signup(&signup("secret1", "secret2")),
            Err(AuthError::Validation(PASSWORD_MISMATCH_MESSAGE.into()))
        );
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("a@b.c"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.c"));
        assert!(!looks_like_email("a b@c.d"));
    }
}
