//! Route guard
//!
//! Decides, from the session alone, whether a page may be shown.

use std::fmt;
use std::str::FromStr;

use crate::session::Session;

/// Pages of the client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, never rendered itself
    Root,
    Login,
    Register,
    Dashboard,
    /// Any path we don't know
    NotFound(String),
}

impl Route {
    /// Parse a path, ignoring query string, fragment and trailing slashes
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Root,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::NotFound(path) => path,
        }
    }

    /// Requires a signed-in user
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }

    /// Only makes sense while signed out
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Route::parse(s))
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Route),
}

/// Whether `route` may be shown for `session`
pub fn authorized(session: &Session, route: &Route) -> Decision {
    let signed_in = session.is_authenticated();

    match route {
        Route::Root if signed_in => Decision::Redirect(Route::Dashboard),
        Route::Root => Decision::Redirect(Route::Login),
        r if r.is_guest_only() && signed_in => Decision::Redirect(Route::Dashboard),
        r if r.is_protected() && !signed_in => Decision::Redirect(Route::Login),
        _ => Decision::Allow,
    }
}

/// Follow redirects until the guard allows a route
pub fn resolve(session: &Session, route: &Route) -> Route {
    // Longest chain is Root -> Dashboard/Login; anything past that is a bug
    const MAX_REDIRECTS: usize = 4;

    let mut current = route.clone();
    for _ in 0..MAX_REDIRECTS {
        match authorized(session, &current) {
            Decision::Allow => return current,
            Decision::Redirect(next) => current = next,
        }
    }

    tracing::error!(route = %route, "Redirect loop detected, falling back to login");
    Route::Login
}
