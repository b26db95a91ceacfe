//! Screen shown after the session has been torn down.

#[must_use]
pub fn render() -> String {
    "You've been logged out\n\n\
     Thank you for using our application. You have been successfully logged out.\n\n  \
     Log in again       /login\n  \
     Back to home       /\n"
        .to_owned()
}
