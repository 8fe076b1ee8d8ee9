use secrecy::ExposeSecret;
use sqlx::PgPool;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use madmimi_optin::domain::{AddonSettings, LicenseStatus};
use madmimi_optin::settings_store::SettingsStore;

use crate::helpers::{hidden_input, TestApp};

#[sqlx::test]
async fn startup_installs_the_default_record(db_pool: PgPool) {
    let app = TestApp::spawn_on_postgres(&db_pool).await;

    assert_eq!(app.store.load().await.unwrap(), AddonSettings::default());
    let rows: i64 = sqlx::query_scalar("SELECT count(*) FROM addon_options")
        .fetch_one(&db_pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test]
async fn saved_settings_reach_the_database(db_pool: PgPool) {
    let app = TestApp::spawn_on_postgres(&db_pool).await;
    app.test_admin.login(&app).await;

    let html = app.get_settings_html().await;
    let response = app
        .post_settings(&serde_json::json!({
            "csrf_token": hidden_input(&html, "csrf_token"),
            "settings_form": "1",
            "username": "acct",
            "api_key": "key123",
            "list_name": "Newsletter",
            "label": "Join us",
            "license_key": "",
        }))
        .await;
    assert_eq!(response.status(), 200);

    let stored: serde_json::Value = sqlx::query_scalar(
        "SELECT option_value FROM addon_options WHERE option_name = 'tgm_exchange_madmimi'",
    )
    .fetch_one(&db_pool)
    .await
    .unwrap();
    assert_eq!(stored["madmimi-username"], "acct");
    assert_eq!(stored["madmimi-list"], "Newsletter");
    assert_eq!(stored["madmimi-checked"], 0);

    let settings = app.store.load().await.unwrap();
    assert_eq!(settings.api_key.expose_secret(), "key123");
    assert_eq!(settings.label, "Join us");
    assert!(!settings.default_checked);
}

#[sqlx::test]
async fn hooks_read_the_persisted_settings(db_pool: PgPool) {
    let app = TestApp::spawn_on_postgres(&db_pool).await;
    app.configure().await;
    Mock::given(method("POST"))
        .and(path("/audience_members"))
        .and(body_string_contains("username=acct"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.madmimi_server)
        .await;

    let response = app
        .post_hook("guest-checkout", &serde_json::json!({ "email": "a@b.com" }))
        .await;

    assert_eq!(response.status(), 200);
}

#[sqlx::test]
async fn license_status_survives_a_restart(db_pool: PgPool) {
    let app = TestApp::spawn_on_postgres(&db_pool).await;
    app.store.set_license_status(LicenseStatus::Valid).await.unwrap();

    let restarted = TestApp::spawn_on_postgres(&db_pool).await;
    assert_eq!(
        restarted.store.license_status().await.unwrap(),
        LicenseStatus::Valid
    );
}
