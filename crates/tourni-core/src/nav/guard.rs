use tracing::debug;

use super::route::Route;
use crate::auth::Session;

/// Which roles a view asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Signed in is enough.
    None,
    /// At least one of these roles.
    Any(Vec<String>),
    /// Every one of these roles.
    All(Vec<String>),
}

impl RoleRequirement {
    /// A single role; "has-any" semantics.
    pub fn role(role: &str) -> Self {
        RoleRequirement::Any(vec![role.to_string()])
    }

    pub fn any_of<R: AsRef<str>>(roles: &[R]) -> Self {
        RoleRequirement::Any(roles.iter().map(|r| r.as_ref().to_string()).collect())
    }

    pub fn all_of<R: AsRef<str>>(roles: &[R]) -> Self {
        RoleRequirement::All(roles.iter().map(|r| r.as_ref().to_string()).collect())
    }
}

impl From<Option<&str>> for RoleRequirement {
    fn from(role: Option<&str>) -> Self {
        match role {
            Some(role) => RoleRequirement::role(role),
            None => RoleRequirement::None,
        }
    }
}

impl From<&str> for RoleRequirement {
    fn from(role: &str) -> Self {
        RoleRequirement::role(role)
    }
}

/// True iff the session is signed in and, when `required_role` is given,
/// holds that role. Roles compare trimmed and case-insensitively.
pub fn can_access(session: &Session, required_role: Option<&str>) -> bool {
    can_access_with(session, &RoleRequirement::from(required_role))
}

pub fn can_access_with(session: &Session, requirement: &RoleRequirement) -> bool {
    if !session.is_authenticated {
        return false;
    }
    match requirement {
        RoleRequirement::None => true,
        RoleRequirement::Any(roles) => session.roles.has_any(roles.as_slice()),
        RoleRequirement::All(roles) => session.roles.has_all(roles.as_slice()),
    }
}

/// What to do with a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Go to `to` instead; `replace` keeps the denied view out of history so
    /// back-navigation cannot loop into it.
    Redirect { to: Route, replace: bool },
}

/// Decide whether `route` may be rendered for `session`.
pub fn guard(session: &Session, route: Route) -> GuardDecision {
    let Some(role) = route.required_role() else {
        return GuardDecision::Render;
    };
    if can_access(session, Some(role)) {
        GuardDecision::Render
    } else {
        debug!(route = %route, required = role, "Access denied, redirecting to login");
        GuardDecision::Redirect {
            to: Route::Login,
            replace: true,
        }
    }
}
