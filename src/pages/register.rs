//! Registration form.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use super::FormOutcome;
use crate::net::api::ApiError;
use crate::state::session::{SessionError, SessionManager};
use crate::util::guard::DEFAULT_AFTER_LOGIN;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const PASSWORDS_MISMATCH_MESSAGE: &str = "Passwords do not match";
pub const PASSWORD_TOO_SHORT_MESSAGE: &str = "Password must be at least 6 characters long";
pub const MISSING_EMAIL_MESSAGE: &str = "Enter your email.";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Check the form before anything is sent to the backend.
///
/// # Errors
///
/// Returns the message to show for the first failing rule.
pub fn validate_register_input(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(MISSING_EMAIL_MESSAGE);
    }
    if password != confirm_password {
        return Err(PASSWORDS_MISMATCH_MESSAGE);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PASSWORD_TOO_SHORT_MESSAGE);
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// Message for a failed registration: the backend's reason when it gave one.
#[must_use]
pub fn failure_message(err: &SessionError) -> String {
    match err {
        SessionError::Api(ApiError::Validation { detail, .. }) if !detail.is_empty() => {
            format!("Registration failed: {}", humanize_detail(detail))
        }
        _ => REGISTRATION_FAILED_MESSAGE.to_owned(),
    }
}

fn humanize_detail(detail: &str) -> String {
    match detail {
        "REGISTER_USER_ALREADY_EXISTS" => "an account with this email already exists".to_owned(),
        other => other.to_owned(),
    }
}

/// Submit the form; a successful registration is followed by login and lands
/// on the dashboard.
pub async fn submit(session: &SessionManager, email: &str, password: &str, confirm_password: &str) -> FormOutcome {
    let (email, password) = match validate_register_input(email, password, confirm_password) {
        Ok(fields) => fields,
        Err(msg) => return FormOutcome::Error(msg.to_owned()),
    };
    match session.register(&email, &password).await {
        Ok(_) => FormOutcome::Navigate(DEFAULT_AFTER_LOGIN.to_owned()),
        Err(e) => FormOutcome::Error(failure_message(&e)),
    }
}

#[must_use]
pub fn render(error: Option<&str>) -> String {
    let mut out = String::from(
        "Create your account\n\n  \
         authgate register --email <email> --password <password> --confirm-password <password>\n",
    );
    if let Some(error) = error {
        out.push('\n');
        out.push_str(error);
        out.push('\n');
    }
    out.push_str("\nAlready have an account? Sign in at /login\n");
    out
}
