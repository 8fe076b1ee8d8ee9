use std::sync::Arc;
use std::{env, io, sync};

use fake::faker::internet::en::{Password, Username};
use fake::faker::lorem::en::Word;
use fake::Fake;
use fdlimit::raise_fd_limit;
use secrecy::SecretString;
use sqlx::PgPool;
use wiremock::MockServer;

use madmimi_optin::authentication::compute_password_hash;
use madmimi_optin::configuration::{Settings, StoreBackend};
use madmimi_optin::domain::AddonSettings;
use madmimi_optin::settings_store::{InMemorySettingsStore, PgSettingsStore, SettingsStore};
use madmimi_optin::startup::Application;
use madmimi_optin::telemetry::{get_subscriber, init_subscriber};

/// Ensure the tracing stack is initialized only once
static TRACING: sync::LazyLock<()> = sync::LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::sink,
        ));
    };
});

/// Test application data
pub struct TestApp {
    pub address: String,
    pub madmimi_server: MockServer,
    pub license_server: MockServer,
    pub store: Arc<dyn SettingsStore>,
    pub test_admin: TestAdmin,
    pub hook_token: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spin up a test application on the in-memory settings store
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemorySettingsStore::new())).await
    }

    /// Spin up a test application on a Postgres settings store
    pub async fn spawn_on_postgres(db_pool: &PgPool) -> Self {
        Self::spawn_with_store(Arc::new(PgSettingsStore::new(db_pool.clone()))).await
    }

    /// Spin up a test application on the given settings store and return its data
    pub async fn spawn_with_store(store: Arc<dyn SettingsStore>) -> Self {
        // Initialize logging
        sync::LazyLock::force(&TRACING);

        // Raise file descriptors limit to avoid "Too many open files" error
        raise_fd_limit().expect("Failed to raise fd limit");

        // Launch mock servers to stand in for Mad Mimi and the licensing service
        let madmimi_server = MockServer::start().await;
        let license_server = MockServer::start().await;

        let test_admin = TestAdmin::generate();
        let hook_token: String = Word().fake();

        // Get settings and modify them for testing
        let config = {
            let mut c = Settings::get_config().expect("Failed to read configuration");
            // Listen on a random TCP port
            c.application.app_port = 0;
            c.application.secure_cookies = false;
            c.settings_store.backend = StoreBackend::Memory;
            c.madmimi.base_url = madmimi_server.uri();
            c.madmimi.timeout_millis = 200;
            c.license.base_url = license_server.uri();
            c.license.timeout_millis = 200;
            c.admin.username.clone_from(&test_admin.username);
            c.admin.password_hash = test_admin.password_hash();
            c.hooks.token = SecretString::from(hook_token.clone());
            c
        };

        // Build the application and get its address
        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", app.port());

        // Build the API client
        let api_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .unwrap();

        // Run the application and return its data
        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run_until_stopped());
        Self {
            address,
            madmimi_server,
            license_server,
            store,
            test_admin,
            hook_token,
            api_client,
        }
    }

    /// Persist a fully configured settings record
    pub async fn configure(&self) -> AddonSettings {
        let settings = AddonSettings {
            username: "acct".into(),
            api_key: SecretString::from("key123".to_string()),
            list_name: "Newsletter".into(),
            ..AddonSettings::default()
        };
        self.store.save(&settings).await.unwrap();
        settings
    }

    /// POST to the login endpoint
    #[allow(clippy::future_not_send)]
    pub async fn post_login<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/login", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET to the login endpoint, extract HTML
    pub async fn get_login_html(&self) -> String {
        self.api_client
            .get(format!("{}/login", &self.address))
            .send()
            .await
            .expect("Failed to send request")
            .text()
            .await
            .unwrap()
    }

    /// POST to the logout endpoint
    pub async fn post_logout(&self) -> reqwest::Response {
        self.api_client
            .post(format!("{}/admin/logout", &self.address))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET a path of the application, extract HTML
    pub async fn get_html(&self, path: &str) -> String {
        self.api_client
            .get(format!("{}{path}", &self.address))
            .send()
            .await
            .expect("Failed to send request")
            .text()
            .await
            .unwrap()
    }

    /// GET to the settings page
    pub async fn get_settings(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/admin/settings", &self.address))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET to the settings page, extract HTML
    pub async fn get_settings_html(&self) -> String {
        self.get_settings().await.text().await.unwrap()
    }

    /// POST to the settings page
    #[allow(clippy::future_not_send)]
    pub async fn post_settings<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/admin/settings", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// POST to the list refresh endpoint
    pub async fn post_lists(&self, username: &str, api_key: &str) -> reqwest::Response {
        self.api_client
            .post(format!("{}/admin/settings/lists", &self.address))
            .form(&[("username", username), ("api_key", api_key)])
            .send()
            .await
            .expect("Failed to send request")
    }

    /// POST to a hook endpoint with the shared token
    #[allow(clippy::future_not_send)]
    pub async fn post_hook<Body>(&self, hook: &str, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}/hooks/{hook}", &self.address))
            .header("X-Hook-Token", &self.hook_token)
            .form(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// GET the opt-in markup hook
    pub async fn get_optin(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/hooks/optin", &self.address))
            .header("X-Hook-Token", &self.hook_token)
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Test administrator data
pub struct TestAdmin {
    pub username: String,
    pub password: String,
}

impl TestAdmin {
    /// Generate new test authentication credentials
    pub fn generate() -> Self {
        Self {
            username: Username().fake(),
            password: Password(32..33).fake(),
        }
    }

    fn password_hash(&self) -> SecretString {
        compute_password_hash(&SecretString::from(self.password.clone()))
            .expect("Failed to hash the test password")
    }

    /// Log in through the login form
    pub async fn login(&self, app: &TestApp) -> reqwest::Response {
        app.post_login(&serde_json::json!({
            "username": &self.username,
            "password": &self.password,
        }))
        .await
    }
}

/// Assert: response is a redirect to the specified location
pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}

/// Extract the value of a hidden form input from a page
pub fn hidden_input(html: &str, name: &str) -> String {
    let marker = format!(r#"name="{name}" value=""#);
    let start = html.find(&marker).expect("Hidden input not found") + marker.len();
    let len = html[start..].find('"').unwrap();
    html[start..start + len].to_string()
}
