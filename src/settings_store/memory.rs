use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AddonSettings, LicenseStatus};
use crate::settings_store::{
    decode_license_status, decode_settings, encode_settings, SettingsStore, StoreError,
    LICENSE_STATUS_OPTION, SETTINGS_OPTION,
};

/// Process-local settings store
#[derive(Default)]
pub struct InMemorySettingsStore {
    options: RwLock<HashMap<&'static str, serde_json::Value>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<AddonSettings, StoreError> {
        match self.options.read().await.get(SETTINGS_OPTION) {
            Some(value) => decode_settings(value.clone()),
            None => Ok(AddonSettings::default()),
        }
    }

    async fn save(&self, settings: &AddonSettings) -> Result<(), StoreError> {
        let value = encode_settings(settings)?;
        self.options.write().await.insert(SETTINGS_OPTION, value);
        Ok(())
    }

    async fn license_status(&self) -> Result<LicenseStatus, StoreError> {
        Ok(self
            .options
            .read()
            .await
            .get(LICENSE_STATUS_OPTION)
            .map_or(LicenseStatus::Unknown, decode_license_status))
    }

    async fn set_license_status(&self, status: LicenseStatus) -> Result<(), StoreError> {
        self.options
            .write()
            .await
            .insert(LICENSE_STATUS_OPTION, status.as_str().into());
        Ok(())
    }

    async fn clear_license_status(&self) -> Result<(), StoreError> {
        self.options.write().await.remove(LICENSE_STATUS_OPTION);
        Ok(())
    }

    async fn install_defaults(&self) -> Result<(), StoreError> {
        let value = encode_settings(&AddonSettings::default())?;
        self.options
            .write()
            .await
            .entry(SETTINGS_OPTION)
            .or_insert(value);
        Ok(())
    }

    async fn uninstall(&self) -> Result<(), StoreError> {
        let mut options = self.options.write().await;
        options.remove(SETTINGS_OPTION);
        options.remove(LICENSE_STATUS_OPTION);
        Ok(())
    }
}
