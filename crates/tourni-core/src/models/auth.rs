use serde::{Deserialize, Serialize};

use crate::auth::role::{RawRoles, RoleSet};
use crate::auth::session::Identity;

/// Minimum password length accepted by the signup form.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Everything the signup form collects, including the confirmation field
/// that never leaves the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupRequest {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }

    pub fn to_registration(&self) -> RegistrationRequest {
        RegistrationRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Body of the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// `data` of a login or registration envelope.
///
/// Current responses carry `token`; older ones carry `jwt`. Roles arrive as
/// `role` or `roles`, each either a string or a list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default, alias = "userName")]
    pub username: Option<String>,
    #[serde(default, alias = "jwt")]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<RawRoles>,
    #[serde(default)]
    pub roles: Option<RawRoles>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl AuthPayload {
    /// Normalize into an `Identity`. `None` when no usable token is present.
    ///
    /// A blank user name falls back to the one the user typed.
    pub fn into_identity(self, submitted_username: &str) -> Option<Identity> {
        let token = self.token.filter(|t| !t.trim().is_empty())?;

        let user_name = self
            .username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| submitted_username.to_string());

        let roles: RoleSet = [self.role, self.roles]
            .into_iter()
            .flatten()
            .flat_map(|raw| RoleSet::from_raw(raw).iter().cloned().collect::<Vec<_>>())
            .collect();

        Some(Identity {
            user_name,
            token,
            roles,
        })
    }
}
