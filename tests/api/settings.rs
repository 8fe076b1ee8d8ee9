use secrecy::ExposeSecret;
use wiremock::matchers::{any, body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use madmimi_optin::domain::{AddonSettings, LicenseStatus};
use madmimi_optin::settings_store::SettingsStore;

use crate::helpers::{assert_is_redirect_to, hidden_input, TestApp};

const LISTS_XML: &str = r#"<lists><list name="Customers"/><list name="Newsletter"/></lists>"#;

#[tokio::test]
async fn a_fresh_install_shows_the_defaults() {
    let app = TestApp::spawn().await;
    app.test_admin.login(&app).await;

    let settings = app.store.load().await.unwrap();
    assert_eq!(settings.label(), "Sign up to receive updates via email!");
    assert_eq!(settings.list_name, "");

    let html = app.get_settings_html().await;
    assert!(html.contains(r#"value="Sign up to receive updates via email!""#));
    assert!(html.contains("No lists to select from at this time."));
}

#[tokio::test]
async fn saving_credentials_and_a_list_persists_them() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/audience_lists/lists.xml"))
        .and(query_param("username", "acct"))
        .and(query_param("api_key", "key123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTS_XML))
        .mount(&app.madmimi_server)
        .await;
    app.test_admin.login(&app).await;

    let html = app.get_settings_html().await;
    let response = app
        .post_settings(&serde_json::json!({
            "csrf_token": hidden_input(&html, "csrf_token"),
            "settings_form": "1",
            "username": "acct",
            "api_key": "key123",
            "list_name": "Newsletter",
            "label": "",
            "default_checked": "1",
            "license_key": "",
        }))
        .await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Your settings have been saved successfully!"));

    let stored = app.store.load().await.unwrap();
    assert_eq!(stored.username, "acct");
    assert_eq!(stored.api_key.expose_secret(), "key123");
    assert_eq!(stored.list_name, "Newsletter");
    assert!(stored.default_checked);
    assert!(stored.is_configured());

    // The refreshed dropdown keeps the remote order and selects the saved list
    let html = app.post_lists("acct", "key123").await.text().await.unwrap();
    assert!(html.contains(
        r#"<option value="Customers">Customers</option><option value="Newsletter" selected="selected">Newsletter</option>"#
    ));
}

#[tokio::test]
async fn a_forged_form_token_changes_nothing() {
    let app = TestApp::spawn().await;
    let before = app.configure().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTS_XML))
        .mount(&app.madmimi_server)
        .await;
    app.test_admin.login(&app).await;

    let response = app
        .post_settings(&serde_json::json!({
            "csrf_token": "forged",
            "settings_form": "1",
            "username": "intruder",
        }))
        .await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("The form nonces do not match."));
    assert!(!html.contains("saved successfully"));

    assert_eq!(app.store.load().await.unwrap(), before);
}

#[tokio::test]
async fn a_partial_submission_keeps_the_other_fields() {
    let app = TestApp::spawn().await;
    let before = app.configure().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTS_XML))
        .mount(&app.madmimi_server)
        .await;
    app.test_admin.login(&app).await;

    let html = app.get_settings_html().await;
    app.post_settings(&serde_json::json!({
        "csrf_token": hidden_input(&html, "csrf_token"),
        "label": "X",
    }))
    .await;

    assert_eq!(
        app.store.load().await.unwrap(),
        AddonSettings {
            label: "X".into(),
            ..before
        }
    );
}

#[tokio::test]
async fn a_failed_license_activation_redirects_with_the_reason() {
    let app = TestApp::spawn().await;
    Mock::given(body_string_contains("edd_action=activate_license"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": false, "error": "revoked"})),
        )
        .expect(1)
        .mount(&app.license_server)
        .await;
    app.test_admin.login(&app).await;

    let html = app.get_settings_html().await;
    let response = app
        .post_settings(&serde_json::json!({
            "csrf_token": hidden_input(&html, "csrf_token"),
            "license_token": hidden_input(&html, "license_token"),
            "license_key": "abc",
            "license_activate": "Activate License",
        }))
        .await;
    assert_is_redirect_to(
        &response,
        "/admin/settings?sl_activation=false&message=Your+license+key+has+been+disabled.",
    );
    assert_eq!(app.store.license_status().await.unwrap(), LicenseStatus::Unknown);

    // Follow the redirect
    let location = response.headers().get("Location").unwrap().to_str().unwrap();
    let html = app.get_html(location).await;
    assert!(html.contains("Your license key has been disabled."));
}

#[tokio::test]
async fn a_successful_license_activation_offers_deactivation() {
    let app = TestApp::spawn().await;
    Mock::given(body_string_contains("edd_action=activate_license"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "license": "valid"})),
        )
        .expect(1)
        .mount(&app.license_server)
        .await;
    app.test_admin.login(&app).await;

    let html = app.get_settings_html().await;
    let response = app
        .post_settings(&serde_json::json!({
            "csrf_token": hidden_input(&html, "csrf_token"),
            "license_token": hidden_input(&html, "license_token"),
            "license_key": "abc",
            "license_activate": "Activate License",
        }))
        .await;

    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"name="license_deactivate""#));
    assert_eq!(app.store.license_status().await.unwrap(), LicenseStatus::Valid);
}
