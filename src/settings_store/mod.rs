//! Persistence of the add-on settings record and the license status.
//!
//! Both values live in an option table keyed by fixed names, the record as a
//! JSON object and the status as a JSON string.

mod memory;
mod postgres;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::{AddonSettings, LicenseStatus, SettingField, DEFAULT_LABEL};

pub use memory::InMemorySettingsStore;
pub use postgres::PgSettingsStore;

/// Option name of the settings record
pub const SETTINGS_OPTION: &str = "tgm_exchange_madmimi";
/// Option name of the license status
pub const LICENSE_STATUS_OPTION: &str = "exchange_madmimi_license_status";

/// Settings store error type
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to reach the settings store")]
    Database(#[from] sqlx::Error),
    #[error("Stored settings are corrupted")]
    Corrupted(#[from] serde_json::Error),
}

/// Key-value persistence for the single settings record
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the settings record, or the defaults if it was never saved
    async fn load(&self) -> Result<AddonSettings, StoreError>;

    /// Replace the whole settings record
    async fn save(&self, settings: &AddonSettings) -> Result<(), StoreError>;

    async fn license_status(&self) -> Result<LicenseStatus, StoreError>;

    async fn set_license_status(&self, status: LicenseStatus) -> Result<(), StoreError>;

    async fn clear_license_status(&self) -> Result<(), StoreError>;

    /// Store the default record unless one already exists
    async fn install_defaults(&self) -> Result<(), StoreError>;

    /// Remove every persisted value
    async fn uninstall(&self) -> Result<(), StoreError>;

    /// Read a single field
    async fn get(&self, field: SettingField) -> Result<String, StoreError> {
        Ok(self.load().await?.get(field))
    }
}

/// Serialized shape of the settings record
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct OptionRecord {
    #[serde(rename = "madmimi-username")]
    username: String,
    #[serde(rename = "madmimi-api-key")]
    api_key: String,
    #[serde(rename = "madmimi-list")]
    list_name: String,
    #[serde(rename = "madmimi-label")]
    label: String,
    #[serde(rename = "madmimi-checked")]
    checked: u8,
    #[serde(rename = "madmimi-license-key")]
    license_key: String,
}

impl From<&AddonSettings> for OptionRecord {
    fn from(settings: &AddonSettings) -> Self {
        Self {
            username: settings.username.clone(),
            api_key: settings.api_key.expose_secret().to_string(),
            list_name: settings.list_name.clone(),
            label: settings.label.clone(),
            checked: u8::from(settings.default_checked),
            license_key: settings.license_key.clone(),
        }
    }
}

impl From<OptionRecord> for AddonSettings {
    fn from(record: OptionRecord) -> Self {
        let label = if record.label.trim().is_empty() {
            DEFAULT_LABEL.to_string()
        } else {
            record.label
        };
        Self {
            username: record.username,
            api_key: SecretString::from(record.api_key),
            list_name: record.list_name,
            label,
            default_checked: record.checked != 0,
            license_key: record.license_key,
        }
    }
}

/// Encode the settings record as an option value
fn encode_settings(settings: &AddonSettings) -> Result<serde_json::Value, StoreError> {
    Ok(serde_json::to_value(OptionRecord::from(settings))?)
}

/// Decode an option value into the settings record
fn decode_settings(value: serde_json::Value) -> Result<AddonSettings, StoreError> {
    let record: OptionRecord = serde_json::from_value(value)?;
    Ok(record.into())
}

/// Decode an option value into a license status
fn decode_license_status(value: &serde_json::Value) -> LicenseStatus {
    value.as_str().map_or(LicenseStatus::Unknown, LicenseStatus::parse)
}
