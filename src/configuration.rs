use std::{env, time};

use config::{Config, ConfigError, Environment, File};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::log::LevelFilter;
use url::ParseError;

use crate::license_client::LicenseClient;
use crate::madmimi_client::MadMimiClient;

/// Settings
#[derive(Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub admin: AdminSettings,
    pub settings_store: SettingsStoreSettings,
    pub madmimi: MadMimiSettings,
    pub license: LicenseSettings,
    pub hooks: HookSettings,
    pub nonce: NonceSettings,
}

impl Settings {
    /// Get settings from configuration files
    pub fn get_config() -> Result<Self, ConfigError> {
        let path = env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
        let config_dir = path.join("config");

        // Detect the running environment (default: `dev`)
        let env: Env = env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "dev".into())
            .try_into()
            .map_err(ConfigError::Message)?;

        // Read the configuration from files and environment variables
        Config::builder()
            // Base configuration file
            .add_source(File::from(config_dir.join("base.yaml")).required(true))
            // Environment-specific configuration file
            .add_source(File::from(config_dir.join(env.as_str())).required(true))
            // Environment variables (e.g., `MADMIMI__APPLICATION__APP_PORT=8888`
            // would set Settings.application.app_port to 8888)
            .add_source(Environment::with_prefix("MADMIMI").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Application settings
#[derive(Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub app_host: String,
    pub app_port: u16,
    /// Public URL of the store, reported to the licensing service
    pub site_url: String,
    pub hmac_secret: SecretString,
    pub secure_cookies: bool,
}

/// Administrator credentials
#[derive(Clone, serde::Deserialize)]
pub struct AdminSettings {
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: SecretString,
}

/// Available settings store backends
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Settings store settings
#[derive(Clone, serde::Deserialize)]
pub struct SettingsStoreSettings {
    pub backend: StoreBackend,
    pub database: DatabaseSettings,
}

/// Database settings
#[derive(Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    username: String,
    password: SecretString,
    host: String,
    port: u16,
    database: String,
    require_ssl: bool,
}

impl DatabaseSettings {
    /// Generate options and flags that can be used to configure a database connection
    pub fn db_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .username(&self.username)
            .password(self.password.expose_secret())
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .ssl_mode(ssl_mode)
            .log_statements(LevelFilter::Trace)
    }
}

/// Mad Mimi API client settings
#[derive(Clone, serde::Deserialize)]
pub struct MadMimiSettings {
    pub base_url: String,
    pub timeout_millis: u64,
}

impl MadMimiSettings {
    /// Build the Mad Mimi client
    pub fn client(&self) -> Result<MadMimiClient, ParseError> {
        Ok(MadMimiClient::new(self.base_url()?, self.timeout()))
    }

    /// Parse base URL
    pub fn base_url(&self) -> Result<Url, ParseError> {
        Url::parse(&self.base_url)
    }

    /// Get configured timeout
    pub const fn timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_millis)
    }
}

/// Licensing service settings
#[derive(Clone, serde::Deserialize)]
pub struct LicenseSettings {
    pub base_url: String,
    pub item_name: String,
    pub timeout_millis: u64,
}

impl LicenseSettings {
    /// Build the licensing client for the given store URL
    pub fn client(&self, site_url: &str) -> Result<LicenseClient, ParseError> {
        Ok(LicenseClient::new(
            Url::parse(&self.base_url)?,
            self.item_name.clone(),
            site_url.to_string(),
            time::Duration::from_millis(self.timeout_millis),
        ))
    }
}

/// Hook endpoint settings
#[derive(Clone, serde::Deserialize)]
pub struct HookSettings {
    /// Shared token the host platform sends in `X-Hook-Token`
    pub token: SecretString,
}

/// Anti-forgery token settings
#[derive(Clone, serde::Deserialize)]
pub struct NonceSettings {
    pub lifetime_secs: u64,
}

impl NonceSettings {
    pub const fn lifetime(&self) -> time::Duration {
        time::Duration::from_secs(self.lifetime_secs)
    }
}

/// Available runtime environments
pub enum Env {
    Development,
    Production,
}

impl Env {
    /// Represent environment as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prd",
        }
    }
}

impl TryFrom<String> for Env {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "dev" => Ok(Self::Development),
            "prd" => Ok(Self::Production),
            other => Err(format!(
                "`{other}` is not a supported environment. Use either `dev` or `prd`"
            )),
        }
    }
}
