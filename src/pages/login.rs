//! Login form.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use super::FormOutcome;
use crate::state::session::SessionManager;
use crate::util::guard::return_location;

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password. Please try again.";
pub const MISSING_FIELDS_MESSAGE: &str = "Enter both email and password.";

/// Trim the email and require both fields.
///
/// # Errors
///
/// Returns the message to show when a field is empty.
pub fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS_MESSAGE);
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// Submit the form. On success navigates back to `from` (or the dashboard);
/// every login failure shows the same generic message.
pub async fn submit(session: &SessionManager, email: &str, password: &str, from: Option<&str>) -> FormOutcome {
    let (email, password) = match validate_login_input(email, password) {
        Ok(fields) => fields,
        Err(msg) => return FormOutcome::Error(msg.to_owned()),
    };
    match session.login(&email, &password).await {
        Ok(_) => FormOutcome::Navigate(return_location(from).to_owned()),
        Err(e) => {
            tracing::debug!(error = %e, "login form rejected");
            FormOutcome::Error(LOGIN_FAILED_MESSAGE.to_owned())
        }
    }
}

#[must_use]
pub fn render(error: Option<&str>) -> String {
    let mut out = String::from(
        "Welcome back\n\
         Enter your credentials to access your account\n\n  \
         authgate login --email <email> --password <password>\n",
    );
    if let Some(error) = error {
        out.push('\n');
        out.push_str(error);
        out.push('\n');
    }
    out.push_str("\nDon't have an account? Sign up at /register\n");
    out
}
