use super::*;
use crate::state::test_helpers::{MockApi, manager, test_user};

// =============================================================================
// Route::parse
// =============================================================================

#[test]
fn parse_known_routes() {
    assert_eq!(Route::parse("/"), Some(Route::Home));
    assert_eq!(Route::parse(""), Some(Route::Home));
    assert_eq!(Route::parse("/login"), Some(Route::Login));
    assert_eq!(Route::parse("/register/"), Some(Route::Register));
    assert_eq!(Route::parse("/dashboard?tab=1"), Some(Route::Dashboard));
    assert_eq!(Route::parse("/post-logout#top"), Some(Route::PostLogout));
}

#[test]
fn parse_unknown_route() {
    assert_eq!(Route::parse("/admin"), None);
}

// =============================================================================
// App::resolve / navigate
// =============================================================================

#[tokio::test]
async fn dashboard_while_initializing_shows_loading() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    let app = App::new(session);
    assert_eq!(app.resolve("/dashboard"), Resolution::Render(LOADING_SCREEN.to_owned()));
}

#[tokio::test]
async fn dashboard_signed_out_redirects_to_login_with_origin() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    session.initialize().await;
    let app = App::new(session);

    assert_eq!(
        app.resolve("/dashboard"),
        Resolution::Redirect { to: "/login".to_owned(), from: Some("/dashboard".to_owned()) }
    );
    let page = app.navigate("/dashboard");
    assert_eq!(page.location, "/login");
    assert_eq!(page.from.as_deref(), Some("/dashboard"));
    assert!(page.body.contains("Welcome back"));
}

#[tokio::test]
async fn dashboard_signed_in_renders_user() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    session.initialize().await;
    session.login("test@example.com", "password123").await.unwrap();
    let app = App::new(session);

    let page = app.navigate("/dashboard");
    assert_eq!(page.location, "/dashboard");
    assert!(page.from.is_none());
    assert!(page.body.contains("Welcome, test@example.com"));
}

#[tokio::test]
async fn auth_screens_redirect_signed_in_visitor_to_dashboard() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    session.initialize().await;
    session.login("test@example.com", "password123").await.unwrap();
    let app = App::new(session);

    assert_eq!(app.navigate("/login").location, "/dashboard");
    assert_eq!(app.navigate("/register").location, "/dashboard");
}

#[tokio::test]
async fn logout_lands_on_post_logout_and_dashboard_is_gated_again() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    session.initialize().await;
    session.login("test@example.com", "password123").await.unwrap();
    let app = App::new(session);

    let signal = app.session().logout().await;
    let page = app.navigate(signal.redirect_to);
    assert_eq!(page.location, "/post-logout");
    assert!(page.body.contains("You've been logged out"));
    assert_eq!(app.navigate("/dashboard").location, "/login");
}

#[tokio::test]
async fn unknown_location_renders_not_found() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    session.initialize().await;
    let app = App::new(session);
    assert_eq!(app.navigate("/nowhere").body, NOT_FOUND_SCREEN);
}

#[tokio::test]
async fn home_while_initializing_shows_loading() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    let app = App::new(session.clone());
    assert_eq!(app.resolve("/"), Resolution::Render(LOADING_SCREEN.to_owned()));

    session.initialize().await;
    assert!(app.navigate("/").body.contains("/register"));
}

#[tokio::test]
async fn home_reflects_auth_state() {
    let (session, _api, _store) = manager(MockApi::accepting("token123", test_user()));
    session.initialize().await;
    let app = App::new(session.clone());
    assert!(app.navigate("/").body.contains("/login"));

    session.login("test@example.com", "password123").await.unwrap();
    assert!(app.navigate("/").body.contains("Go to Dashboard"));
}
