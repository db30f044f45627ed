//! Route table and access guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends ask [`check_route`] before showing a page. The decision is a
//! pure function of the session snapshot so every front end redirects the
//! same way.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::fmt;

use crate::net::types::{Role, Status, User};
use crate::state::session::Session;

/// Where a successful sign-in lands.
pub const POST_LOGIN_ROUTE: Route = Route::Dashboard;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Auth,
    About,
    Administration,
    Membership,
    Dashboard,
    Admin,
    Contact,
}

impl Route {
    pub const ALL: [Self; 8] = [
        Self::Home,
        Self::Auth,
        Self::About,
        Self::Administration,
        Self::Membership,
        Self::Dashboard,
        Self::Admin,
        Self::Contact,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Auth => "/auth",
            Self::About => "/about",
            Self::Administration => "/administration",
            Self::Membership => "/membership",
            Self::Dashboard => "/dashboard",
            Self::Admin => "/admin",
            Self::Contact => "/contact",
        }
    }

    /// Match a path, ignoring a trailing slash and any query string.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Access requirements, or `None` for public pages.
    #[must_use]
    pub fn requirements(self) -> Option<Requirements> {
        match self {
            Self::Home | Self::Auth | Self::About | Self::Administration | Self::Contact => None,
            Self::Membership => Some(Requirements::any_status()),
            Self::Dashboard => Some(Requirements::default()),
            Self::Admin => Some(Requirements::role(Role::Head)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What a protected route demands of the signed-in user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Requirements {
    pub role: Option<Role>,
    /// `None` accepts any status.
    pub status: Option<Status>,
}

impl Default for Requirements {
    fn default() -> Self {
        Self { role: None, status: Some(Status::Active) }
    }
}

impl Requirements {
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self { role: Some(role), ..Self::default() }
    }

    #[must_use]
    pub fn any_status() -> Self {
        Self { role: None, status: None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Session still loading; render nothing yet.
    Suspend,
    Allow,
    Redirect(Route),
}

/// Decide access for `session` against `req`.
///
/// Checks run in order: loading, identity, role, status.
#[must_use]
pub fn evaluate(session: &Session, req: &Requirements) -> Decision {
    if session.is_loading {
        return Decision::Suspend;
    }
    let Some(user) = &session.identity else {
        return Decision::Redirect(Route::Auth);
    };
    if let Some(role) = req.role
        && user.role != Some(role)
    {
        return Decision::Redirect(Route::Home);
    }
    if let Some(status) = req.status
        && user.status != status
    {
        return Decision::Redirect(Route::Membership);
    }
    Decision::Allow
}

/// Guard decision for a named route. Public routes are always allowed.
#[must_use]
pub fn check_route(session: &Session, route: Route) -> Decision {
    match route.requirements() {
        Some(req) => evaluate(session, &req),
        None => Decision::Allow,
    }
}

/// The landing page the navigation bar links a signed-in user to.
#[must_use]
pub fn home_for(user: &User) -> Route {
    if user.is_head() { Route::Admin } else { Route::Dashboard }
}
