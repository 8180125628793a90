use crate::helpers::{assert_is_redirect_to, TestApp};

#[tokio::test]
async fn logout_clears_session_state() {
    let app = TestApp::spawn().await;

    // Login
    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home");
    assert_eq!(app.store.session_count().await, 1);

    // Logout
    let response = app.delete_current_session().await;
    assert_is_redirect_to(&response, "/");

    // Follow the redirect
    let html = app.get_html("/").await;
    assert!(html.contains("<p><i>Successfully logged out.</i></p>"));

    // Attempt to access the home page after logout
    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/sessions/new");
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn the_logout_form_logs_out() {
    let app = TestApp::spawn().await;
    app.test_user.login(&app).await;

    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/");

    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/sessions/new");
}

#[tokio::test]
async fn logout_resets_return_to_as_well() {
    let app = TestApp::spawn().await;
    app.test_user.login(&app).await;
    app.delete_current_session().await;

    // Nothing recorded before the logout survives it
    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home");
}

#[tokio::test]
async fn you_must_be_logged_in_to_log_out() {
    let app = TestApp::spawn().await;

    let response = app.delete_current_session().await;
    assert_is_redirect_to(&response, "/sessions/new");

    // Only GET requests are remembered as `return_to`
    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home");
}

#[tokio::test]
async fn logging_out_of_a_revoked_session_is_reported() {
    let app = TestApp::spawn().await;
    app.test_user.login(&app).await;
    assert_eq!(app.store.revoke_user_sessions(app.test_user.user_id).await, 1);

    let response = app.delete_current_session().await;
    assert_is_redirect_to(&response, "/sessions/new");

    let html = app.get_login_html().await;
    assert!(html.contains("<p><i>You are not logged in.</i></p>"));

    // The stale cookie state is gone as well
    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/sessions/new");
}

#[tokio::test]
async fn logout_lands_on_the_configured_root() {
    let app = TestApp::spawn_with(|config| config.root_path = "/welcome".into()).await;
    app.test_user.login(&app).await;

    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/welcome");

    let html = app.get_html("/welcome").await;
    assert!(html.contains("<p><i>Successfully logged out.</i></p>"));
}
