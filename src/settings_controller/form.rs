use secrecy::{ExposeSecret, SecretString};

use crate::domain::AddonSettings;

/// License button pressed alongside the settings submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LicenseAction {
    Activate,
    Deactivate,
}

/// Parsed settings submission
///
/// Every field is optional: absent fields keep their persisted value.
#[derive(Debug, Default)]
pub struct SettingsForm {
    pub username: Option<String>,
    pub api_key: Option<SecretString>,
    pub list_name: Option<String>,
    pub label: Option<String>,
    pub default_checked: Option<bool>,
    pub license_key: Option<String>,
    pub license_action: Option<LicenseAction>,
    pub license_token: Option<String>,
}

impl SettingsForm {
    /// Merge the submitted fields over `current`
    pub fn merge_into(&self, current: &AddonSettings) -> AddonSettings {
        let mut merged = current.clone();
        if let Some(username) = &self.username {
            merged.username = username.trim().to_string();
        }
        if let Some(api_key) = &self.api_key {
            merged.api_key = SecretString::from(api_key.expose_secret().trim().to_string());
        }
        if let Some(list_name) = &self.list_name {
            merged.list_name = sanitize_list_name(list_name);
        }
        if let Some(label) = &self.label {
            merged.label = label.trim().to_string();
        }
        if let Some(default_checked) = self.default_checked {
            merged.default_checked = default_checked;
        }
        if let Some(license_key) = &self.license_key {
            merged.license_key = license_key.trim().to_string();
        }
        merged
    }
}

/// List names are opaque, only control characters are dropped; markup is
/// escaped when rendered
fn sanitize_list_name(list_name: &str) -> String {
    list_name.chars().filter(|c| !c.is_control()).collect()
}
