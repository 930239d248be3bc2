use super::guard::can_access;
use super::route::Route;
use crate::auth::{Session, ADMIN};

/// A control in the header bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderControl {
    Login,
    Welcome(String),
    Logout,
}

impl HeaderControl {
    pub fn label(&self) -> String {
        match self {
            HeaderControl::Login => "Login".to_string(),
            HeaderControl::Welcome(name) => format!("Welcome, {name}"),
            HeaderControl::Logout => "Logout".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub route: Route,
    pub label: &'static str,
}

impl NavLink {
    fn to(route: Route) -> Self {
        Self {
            route,
            label: route.title(),
        }
    }
}

/// Header and sidebar contents derived from a session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub header: Vec<HeaderControl>,
    pub sidebar: Vec<NavLink>,
}

impl Shell {
    pub fn from_session(session: &Session) -> Self {
        let header = if session.is_authenticated {
            vec![
                HeaderControl::Welcome(session.user_name.clone()),
                HeaderControl::Logout,
            ]
        } else {
            vec![HeaderControl::Login]
        };

        let mut sidebar = vec![NavLink::to(Route::PointsTable)];
        if can_access(session, Some(ADMIN)) {
            sidebar.extend(
                [Route::AddMatchResult, Route::AddTournament, Route::AddTeam]
                    .into_iter()
                    .map(NavLink::to),
            );
        }

        Self { header, sidebar }
    }

    pub fn shows_logout(&self) -> bool {
        self.header.contains(&HeaderControl::Logout)
    }

    pub fn links_to(&self, route: Route) -> bool {
        self.sidebar.iter().any(|l| l.route == route)
    }
}
