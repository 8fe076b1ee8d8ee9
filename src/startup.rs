use std::sync::Arc;
use std::{io, net, time};

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::authentication::{reject_logged_out_users, require_hook_token};
use crate::configuration::{AdminSettings, HookSettings, Settings, SettingsStoreSettings, StoreBackend};
use crate::list_directory::ListDirectory;
use crate::nonce::NonceIssuer;
use crate::optin_gate::OptinGate;
use crate::routes::{
    admin_js, guest_checkout_hook, healthcheck, login, login_form, logout, optin_markup,
    refresh_lists, register_hook, registration_field, save_settings, settings_page,
};
use crate::settings_controller::SettingsController;
use crate::settings_store::{InMemorySettingsStore, PgSettingsStore, SettingsStore};

/// Application
pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    /// Build an application based on settings
    pub async fn build(config: Settings) -> anyhow::Result<Self> {
        let store = build_store(&config.settings_store).await?;
        Self::build_with_store(config, store).await
    }

    /// Build an application based on settings and an existing settings store
    pub async fn build_with_store(
        config: Settings,
        store: Arc<dyn SettingsStore>,
    ) -> anyhow::Result<Self> {
        // First start installs the default settings
        store
            .install_defaults()
            .await
            .context("Failed to install the default settings")?;

        // Build the remote clients
        let madmimi_client = config
            .madmimi
            .client()
            .context("Invalid Mad Mimi base URL")?;
        let license_client = config
            .license
            .client(&config.application.site_url)
            .context("Invalid licensing service base URL")?;

        let controller = SettingsController::new(
            store.clone(),
            ListDirectory::new(madmimi_client.clone()),
            license_client,
            NonceIssuer::new(
                config.application.hmac_secret.clone(),
                config.nonce.lifetime(),
            ),
        );
        let gate = OptinGate::new(store, madmimi_client);

        // Run the HTTP server and return its data
        let listener = net::TcpListener::bind(format!(
            "{}:{}",
            config.application.app_host, config.application.app_port
        ))?;
        let port = listener.local_addr()?.port();
        let server = run_server(
            listener,
            controller,
            gate,
            config.admin,
            config.hooks,
            &config.application.hmac_secret,
            config.application.secure_cookies,
        )?;
        Ok(Self { server, port })
    }

    /// Get application port
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Run application until it is stopped
    pub async fn run_until_stopped(self) -> io::Result<()> {
        self.server.await
    }
}

/// Open the configured settings store backend
pub async fn build_store(config: &SettingsStoreSettings) -> anyhow::Result<Arc<dyn SettingsStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemorySettingsStore::new())),
        StoreBackend::Postgres => {
            let db_pool = PgPoolOptions::new()
                .acquire_timeout(time::Duration::from_secs(2))
                .connect_lazy_with(config.database.db_options());
            let store = PgSettingsStore::new(db_pool);
            store
                .migrate()
                .await
                .context("Failed to migrate the settings database")?;
            Ok(Arc::new(store))
        }
    }
}

/// Remove every value the add-on persisted in the configured store
///
/// The in-memory backend keeps nothing across processes, so there is nothing
/// an uninstall could remove from it.
pub async fn uninstall(config: &SettingsStoreSettings) -> anyhow::Result<()> {
    if config.backend == StoreBackend::Memory {
        anyhow::bail!(
            "The configured settings store is the in-memory backend, which persists nothing; \
             select the postgres backend to uninstall"
        );
    }
    let store = build_store(config).await?;
    store
        .uninstall()
        .await
        .context("Failed to remove the add-on settings")?;
    Ok(())
}

/// Run the HTTP server
pub fn run_server(
    listener: net::TcpListener,
    controller: SettingsController,
    gate: OptinGate,
    admin: AdminSettings,
    hooks: HookSettings,
    hmac_secret: &SecretString,
    secure_cookies: bool,
) -> anyhow::Result<Server> {
    // Derive the cookie signing key from the HMAC secret
    let signing_key = Key::from(hmac_secret.expose_secret().as_bytes());

    // Build message framework
    let message_store = CookieMessageStore::builder(signing_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    // Prepare data to be added the application context
    let controller = web::Data::new(controller);
    let gate = web::Data::new(gate);
    let admin = web::Data::new(admin);
    let hooks = web::Data::new(hooks);

    // Start the HTTP server
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), signing_key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .route("/healthcheck", web::get().to(healthcheck))
            .route("/login", web::get().to(login_form))
            .route("/login", web::post().to(login))
            .service(
                web::scope("/admin")
                    .wrap(from_fn(reject_logged_out_users))
                    .route("/settings", web::get().to(settings_page))
                    .route("/settings", web::post().to(save_settings))
                    .route("/settings/lists", web::post().to(refresh_lists))
                    .route("/assets/admin.js", web::get().to(admin_js))
                    .route("/logout", web::post().to(logout)),
            )
            .service(
                web::scope("/hooks")
                    .wrap(from_fn(require_hook_token))
                    .route("/register", web::post().to(register_hook))
                    .route("/guest-checkout", web::post().to(guest_checkout_hook))
                    .route("/optin", web::get().to(optin_markup))
                    .route("/registration-field", web::post().to(registration_field)),
            )
            .app_data(controller.clone())
            .app_data(gate.clone())
            .app_data(admin.clone())
            .app_data(hooks.clone())
    })
    .listen(listener)?
    .run())
}
