use crate::helpers::{assert_is_redirect_to, TestApp};

#[tokio::test]
async fn an_error_flash_message_is_set_on_failure() {
    let app = TestApp::spawn().await;
    let body = serde_json::json!({
        "username": "random_username",
        "password": "random_password",
    });

    // Try to login and follow redirect
    let response = app.post_login(&body).await;
    assert_is_redirect_to(&response, "/login");

    // Follow the redirect
    let html = app.get_login_html().await;
    assert!(html.contains(r"<p><i>Authentication failed</i></p>"));

    // Reload the login page
    let html = app.get_login_html().await;
    assert!(!html.contains(r"<p><i>Authentication failed</i></p>"));
}

#[tokio::test]
async fn the_right_username_with_a_wrong_password_is_rejected() {
    let app = TestApp::spawn().await;
    let body = serde_json::json!({
        "username": &app.test_admin.username,
        "password": "not-the-password",
    });

    let response = app.post_login(&body).await;
    assert_is_redirect_to(&response, "/login");

    let response = app.get_settings().await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn redirect_to_settings_after_login_success() {
    let app = TestApp::spawn().await;

    let response = app.test_admin.login(&app).await;
    assert_is_redirect_to(&response, "/admin/settings");

    let html = app.get_settings_html().await;
    assert!(html.contains("To setup Mad Mimi, fill out the settings below."));
}

#[tokio::test]
async fn you_must_be_logged_in_to_access_the_settings() {
    let app = TestApp::spawn().await;

    let response = app.get_settings().await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn logout_clears_session_state() {
    let app = TestApp::spawn().await;

    // Login
    let response = app.test_admin.login(&app).await;
    assert_is_redirect_to(&response, "/admin/settings");

    // Logout
    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/login");

    // Follow the redirect
    let html = app.get_login_html().await;
    assert!(html.contains("<p><i>You have successfully logged out</i></p>"));

    // Attempt to access the settings after logout
    let response = app.get_settings().await;
    assert_is_redirect_to(&response, "/login");
}
