//! Route guard for protected screens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected route asks the guard before rendering, so unauthenticated
//! visitors get identical redirect behavior everywhere and can be sent back
//! to where they were going once they log in.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::state::session::{SessionPhase, SessionState};

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_AFTER_LOGIN: &str = "/dashboard";

/// What a protected route should do for the current session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not settled yet; show a placeholder.
    Loading,
    /// Send the visitor to `to`, remembering the location they asked for.
    Redirect { to: &'static str, from: String },
    /// Render the protected content.
    Render,
}

/// Decide what to do with a request for the protected location `requested`.
#[must_use]
pub fn guard(state: &SessionState, requested: &str) -> GuardDecision {
    if state.is_loading || state.phase == SessionPhase::Initializing {
        return GuardDecision::Loading;
    }
    if !state.is_authenticated() {
        return GuardDecision::Redirect { to: LOGIN_PATH, from: requested.to_owned() };
    }
    GuardDecision::Render
}

/// Where to go after a successful login: the remembered location, unless it
/// is missing or points back at an auth screen.
#[must_use]
pub fn return_location(from: Option<&str>) -> &str {
    match from.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !is_auth_screen(path) => path,
        _ => DEFAULT_AFTER_LOGIN,
    }
}

fn is_auth_screen(path: &str) -> bool {
    matches!(path.split(['?', '#']).next(), Some("/login" | "/register"))
}
