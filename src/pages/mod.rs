//! Plain-text screens and the form logic behind them.
//!
//! DESIGN
//! ======
//! Views only read `SessionState` and call `SessionManager` operations; they
//! never touch the token store or the backend directly.

pub mod dashboard;
pub mod home;
pub mod login;
pub mod post_logout;
pub mod register;

/// Result of submitting an auth form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormOutcome {
    /// Submission succeeded; go to this location.
    Navigate(String),
    /// Show this message next to the form.
    Error(String),
}
