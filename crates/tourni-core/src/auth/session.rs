use serde::{Deserialize, Serialize};
use tracing::debug;

use super::role::{RawRoles, RoleSet};
use crate::storage::{PersistedStore, Storage};

/// Storage key for the bearer token (stored verbatim).
pub const TOKEN_KEY: &str = "jwt";
/// Storage key for the signed-in user name (stored verbatim).
pub const USERNAME_KEY: &str = "username";
/// Storage key for the role list (JSON array).
pub const ROLE_KEY: &str = "role";
/// Storage key for the authenticated flag (JSON bool).
pub const AUTHENTICATED_KEY: &str = "isAuthenticated";

/// Every key the session owns; removed together on logout.
pub const SESSION_KEYS: [&str; 4] = [TOKEN_KEY, USERNAME_KEY, ROLE_KEY, AUTHENTICATED_KEY];

/// Read-only view of who is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub user_name: String,
    pub token: String,
    pub roles: RoleSet,
}

impl Session {
    /// The bearer token, if signed in.
    pub fn bearer(&self) -> Option<&str> {
        if self.is_authenticated && !self.token.is_empty() {
            Some(&self.token)
        } else {
            None
        }
    }
}

/// Identity extracted from a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_name: String,
    pub token: String,
    pub roles: RoleSet,
}

/// In-memory session mirrored into durable storage.
///
/// Every mutation updates memory and then writes the affected keys through
/// before returning, so storage never lags the in-memory view.
pub struct SessionState<S: Storage> {
    session: Session,
    store: PersistedStore<S>,
}

impl<S: Storage> SessionState<S> {
    /// Build the session from whatever the store holds.
    ///
    /// Each field is read on its own; a missing or malformed one falls back
    /// to its default without affecting the rest. The authenticated flag is
    /// only honoured alongside a non-empty token, and a token without the
    /// flag is discarded.
    pub fn hydrate(mut store: PersistedStore<S>) -> Self {
        let mut token = store.get_string(TOKEN_KEY).unwrap_or_default();
        let user_name = store.get_string(USERNAME_KEY).unwrap_or_default();
        let roles = store
            .get_json::<RawRoles>(ROLE_KEY)
            .map(RoleSet::from_raw)
            .unwrap_or_default();
        let flag = store.get_json::<bool>(AUTHENTICATED_KEY).unwrap_or(false);
        let is_authenticated = flag && !token.is_empty();
        if !is_authenticated && !token.is_empty() {
            debug!("Dropping stored token without an authenticated flag");
            token.clear();
            store.remove(TOKEN_KEY);
        }

        let session = Session {
            is_authenticated,
            user_name,
            token,
            roles,
        };
        debug!(
            authenticated = session.is_authenticated,
            user = %session.user_name,
            roles = %session.roles,
            "Session hydrated"
        );
        Self { session, store }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    pub fn store(&self) -> &PersistedStore<S> {
        &self.store
    }

    /// Set the authenticated flag. Clearing it also drops the token, since a
    /// token without an authenticated session must not be sent anywhere.
    pub fn set_authenticated(&mut self, authenticated: bool) {
        if !authenticated {
            self.invalidate();
            return;
        }
        if self.session.token.is_empty() {
            debug!("Ignoring authenticated flag without a token");
            return;
        }
        self.session.is_authenticated = true;
        self.store.set(AUTHENTICATED_KEY, &true);
    }

    pub fn set_user(&mut self, user_name: &str) {
        self.session.user_name = user_name.to_string();
        self.store.set(USERNAME_KEY, user_name);
    }

    pub fn set_roles(&mut self, roles: RoleSet) {
        self.store.set(ROLE_KEY, &roles.to_vec());
        self.session.roles = roles;
    }

    /// Apply a successful auth response: all fields change in one step.
    pub fn apply_identity(&mut self, identity: Identity) {
        self.session = Session {
            is_authenticated: !identity.token.is_empty(),
            user_name: identity.user_name,
            token: identity.token,
            roles: identity.roles,
        };
        self.store.set(TOKEN_KEY, self.session.token.as_str());
        self.store.set(USERNAME_KEY, self.session.user_name.as_str());
        self.store.set(ROLE_KEY, &self.session.roles.to_vec());
        self.store.set(AUTHENTICATED_KEY, &self.session.is_authenticated);
    }

    /// Mark the session as not authenticated and forget the token.
    /// User name and roles are left as they were.
    pub fn invalidate(&mut self) {
        self.session.is_authenticated = false;
        self.session.token.clear();
        self.store.remove(TOKEN_KEY);
        self.store.set(AUTHENTICATED_KEY, &false);
    }

    /// Back to the empty session; every session key is removed.
    pub fn reset(&mut self) {
        self.session = Session::default();
        self.store.remove_all(&SESSION_KEYS);
    }
}
