use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

use madmimi_optin::settings_store::SettingsStore;

use crate::helpers::{assert_is_redirect_to, TestApp};

#[tokio::test]
async fn refreshing_lists_requires_login() {
    let app = TestApp::spawn().await;

    let response = app.post_lists("acct", "key123").await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn empty_credentials_render_the_placeholder_without_a_remote_call() {
    let app = TestApp::spawn().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.madmimi_server)
        .await;
    app.test_admin.login(&app).await;

    let response = app.post_lists("", "").await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("No lists to select from at this time."));
}

#[tokio::test]
async fn bad_credentials_render_an_error_dropdown() {
    let app = TestApp::spawn().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(401).set_body_string("Unable to authenticate"))
        .mount(&app.madmimi_server)
        .await;
    app.test_admin.login(&app).await;

    let html = app.post_lists("acct", "wrong").await.text().await.unwrap();
    assert!(html.contains(r#"class="madmimi-error""#));
    assert!(html.contains("Invalid credentials. Please try again."));
}

#[tokio::test]
async fn unsaved_credentials_are_never_persisted() {
    let app = TestApp::spawn().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("<lists/>"))
        .mount(&app.madmimi_server)
        .await;
    app.test_admin.login(&app).await;

    app.post_lists("acct", "key123").await;

    let stored = app.store.load().await.unwrap();
    assert_eq!(stored.username, "");
}
