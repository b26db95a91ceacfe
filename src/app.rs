//! Route table: maps locations to screens, gating protected ones.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hosting shell hands every navigation to `App::navigate` and prints the
//! resulting page. Redirects produced by the guard or by auth screens are
//! followed here so the shell always receives a final page.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use crate::pages::{dashboard, home, login, post_logout, register};
use crate::state::session::SessionManager;
use crate::util::guard::{DEFAULT_AFTER_LOGIN, GuardDecision, guard};

const MAX_REDIRECTS: usize = 4;
pub const LOADING_SCREEN: &str = "Loading...\n";
pub const NOT_FOUND_SCREEN: &str = "Page not found.\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    PostLogout,
}

impl Route {
    /// Match a location, ignoring any query string or fragment.
    #[must_use]
    pub fn parse(location: &str) -> Option<Self> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        match path {
            "" | "/" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/dashboard" => Some(Self::Dashboard),
            "/post-logout" => Some(Self::PostLogout),
            _ => None,
        }
    }
}

/// One resolution step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(String),
    Redirect { to: String, from: Option<String> },
}

/// Final page after following redirects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Location actually rendered.
    pub location: String,
    /// Protected location the visitor was bounced from, if any.
    pub from: Option<String>,
    pub body: String,
}

#[derive(Clone)]
pub struct App {
    session: SessionManager,
}

impl App {
    #[must_use]
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Resolve `location` once, without following redirects.
    #[must_use]
    pub fn resolve(&self, location: &str) -> Resolution {
        let state = self.session.state();
        let Some(route) = Route::parse(location) else {
            return Resolution::Render(NOT_FOUND_SCREEN.to_owned());
        };
        let authenticated = state.is_authenticated();
        match route {
            Route::Dashboard => match guard(&state, location) {
                GuardDecision::Loading => Resolution::Render(LOADING_SCREEN.to_owned()),
                GuardDecision::Redirect { to, from } => Resolution::Redirect { to: to.to_owned(), from: Some(from) },
                GuardDecision::Render => match &state.user {
                    Some(user) => Resolution::Render(dashboard::render(user)),
                    None => Resolution::Render(LOADING_SCREEN.to_owned()),
                },
            },
            Route::Home if state.is_loading => Resolution::Render(LOADING_SCREEN.to_owned()),
            Route::Home => Resolution::Render(home::render(authenticated)),
            Route::Login | Route::Register if authenticated => {
                Resolution::Redirect { to: DEFAULT_AFTER_LOGIN.to_owned(), from: None }
            }
            Route::Login => Resolution::Render(login::render(None)),
            Route::Register => Resolution::Render(register::render(None)),
            Route::PostLogout => Resolution::Render(post_logout::render()),
        }
    }

    /// Resolve `location`, following redirects to a final page.
    #[must_use]
    pub fn navigate(&self, location: &str) -> Page {
        let mut current = location.to_owned();
        let mut from = None;
        for _ in 0..MAX_REDIRECTS {
            match self.resolve(&current) {
                Resolution::Render(body) => return Page { location: current, from, body },
                Resolution::Redirect { to, from: origin } => {
                    tracing::debug!(from = %current, %to, "redirect");
                    if origin.is_some() {
                        from = origin;
                    }
                    current = to;
                }
            }
        }
        tracing::warn!(%location, "redirect limit reached");
        Page { location: current, from, body: NOT_FOUND_SCREEN.to_owned() }
    }
}
