//! Protected dashboard screen.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use crate::net::types::User;

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Render the dashboard for the signed-in `user`.
#[must_use]
pub fn render(user: &User) -> String {
    format!(
        "Dashboard                              Welcome, {email}\n\n\
         Welcome to your Dashboard!\n\
         You are successfully logged in as {email}\n\n\
         User Information\n  \
         ID:        {id}\n  \
         Email:     {email}\n  \
         Active:    {active}\n  \
         Verified:  {verified}\n  \
         Superuser: {superuser}\n\n  \
         Logout             authgate logout\n",
        email = user.email,
        id = user.id,
        active = yes_no(user.is_active),
        verified = yes_no(user.is_verified),
        superuser = yes_no(user.is_superuser),
    )
}
