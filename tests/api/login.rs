use crate::helpers::{assert_is_redirect_to, TestApp};

#[tokio::test]
async fn the_login_form_is_displayed() {
    let app = TestApp::spawn().await;

    for path in ["/sessions/new", "/login"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), 200);
        let html = response.text().await.unwrap();
        assert!(html.contains(r#"<form action="/sessions" method="post">"#));
        assert!(html.contains(r#"value="""#));
    }
}

#[tokio::test]
async fn a_successful_login_redirects_home_with_a_notice() {
    let app = TestApp::spawn().await;

    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home");

    // Follow the redirect
    let html = app.get_html("/home").await;
    assert!(html.contains("<p><i>Successfully logged in.</i></p>"));
    assert!(html.contains(&format!("Welcome, {}!", app.test_user.username)));

    // The notice is only shown once
    let html = app.get_html("/home").await;
    assert!(!html.contains("Successfully logged in."));
    assert_eq!(app.store.session_count().await, 1);
}

#[tokio::test]
async fn a_successful_login_returns_to_the_page_that_required_it() {
    let app = TestApp::spawn().await;

    let response = app.get("/home?tab=settings").await;
    assert_is_redirect_to(&response, "/sessions/new");

    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home?tab=settings");
}

#[tokio::test]
async fn return_to_is_cleared_after_a_successful_login() {
    let app = TestApp::spawn().await;

    app.get("/home?tab=settings").await;
    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home?tab=settings");

    // A second login from the same browser goes to the default location
    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home");
}

#[tokio::test]
async fn logging_in_twice_keeps_a_single_login_session() {
    let app = TestApp::spawn().await;

    app.test_user.login(&app).await;
    app.test_user.login(&app).await;
    assert_eq!(app.store.session_count().await, 1);

    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/");
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn invalid_credentials_redisplay_the_form() {
    let app = TestApp::spawn().await;
    let body = serde_json::json!({
        "username": &app.test_user.username,
        "password": "random_password",
    });

    let response = app.post_login(&body).await;

    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("<p><b>Invalid username or password.</b></p>"));
    assert!(html.contains(&format!(r#"value="{}""#, app.test_user.username)));
    assert!(!html.contains("random_password"));

    // Still logged out, and no notice was queued
    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/sessions/new");
    let html = app.get_login_html().await;
    assert!(!html.contains("<p><i>"));
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn a_failed_login_keeps_return_to() {
    let app = TestApp::spawn().await;
    app.get("/home?tab=settings").await;

    let response = app
        .post_login(&serde_json::json!({
            "username": "random_username",
            "password": "random_password",
        }))
        .await;
    assert_eq!(response.status(), 200);

    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/home?tab=settings");
}

#[tokio::test]
async fn missing_fields_are_reported_on_the_form() {
    let app = TestApp::spawn().await;
    let test_cases = [
        (serde_json::json!({}), 2, "missing username and password"),
        (
            serde_json::json!({ "username": &app.test_user.username }),
            1,
            "missing password",
        ),
        (
            serde_json::json!({ "username": "", "password": &app.test_user.password }),
            1,
            "empty username",
        ),
    ];

    for (body, expected_errors, description) in test_cases {
        let response = app.post_login(&body).await;
        assert_eq!(
            response.status(),
            200,
            "The form was not redisplayed when the payload had {description}"
        );
        let html = response.text().await.unwrap();
        assert_eq!(
            html.matches("be blank").count(),
            expected_errors,
            "Unexpected field errors when the payload had {description}"
        );
    }
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn the_redisplayed_username_is_escaped() {
    let app = TestApp::spawn().await;

    let response = app
        .post_login(&serde_json::json!({
            "username": r#""><script>alert(1)</script>"#,
            "password": "random_password",
        }))
        .await;

    let html = response.text().await.unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn a_login_without_return_to_lands_on_the_configured_home() {
    let app = TestApp::spawn_with(|config| config.home_path = "/dashboard".into()).await;

    let response = app.test_user.login(&app).await;
    assert_is_redirect_to(&response, "/dashboard");

    let html = app.get_html("/dashboard").await;
    assert!(html.contains(&format!("Welcome, {}!", app.test_user.username)));
}
