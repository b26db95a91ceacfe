//! Landing screen.

/// Render the landing screen. Signed-in visitors get a dashboard link instead
/// of the login/register links.
#[must_use]
pub fn render(authenticated: bool) -> String {
    let mut out = String::from("Welcome\n\nRegister or log in to reach your dashboard.\n\n");
    if authenticated {
        out.push_str("  Go to Dashboard    /dashboard\n");
    } else {
        out.push_str("  Login              /login\n");
        out.push_str("  Register           /register\n");
    }
    out
}
