use std::fmt;

use crate::auth::role::ADMIN;

/// Every view the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    PointsTable,
    AddMatchResult,
    AddTournament,
    AddTeam,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::PointsTable => "/pointsTable",
            Route::AddMatchResult => "/addMatchResult",
            Route::AddTournament => "/addTournament",
            Route::AddTeam => "/addTeam",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Signup => "Sign up",
            Route::PointsTable => "Points table",
            Route::AddMatchResult => "Add match result",
            Route::AddTournament => "Add tournament",
            Route::AddTeam => "Add team",
        }
    }

    /// Role needed to open the view. `None` means anyone may open it,
    /// signed in or not.
    pub fn required_role(&self) -> Option<&'static str> {
        match self {
            Route::AddMatchResult | Route::AddTournament | Route::AddTeam => Some(ADMIN),
            Route::Home | Route::Login | Route::Signup | Route::PointsTable => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
