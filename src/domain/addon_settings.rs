use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Checkbox label used until the administrator picks one
pub const DEFAULT_LABEL: &str = "Sign up to receive updates via email!";

/// Add-on settings record
#[derive(Clone)]
pub struct AddonSettings {
    pub username: String,
    pub api_key: SecretString,
    pub list_name: String,
    pub label: String,
    pub default_checked: bool,
    pub license_key: String,
}

impl AddonSettings {
    /// True iff username, API key and list name are all non-blank
    pub fn is_configured(&self) -> bool {
        !self.username.trim().is_empty()
            && !self.api_key.expose_secret().trim().is_empty()
            && !self.list_name.trim().is_empty()
    }

    /// Checkbox label, falling back to the default text when unset
    pub fn label(&self) -> &str {
        if self.label.trim().is_empty() {
            DEFAULT_LABEL
        } else {
            &self.label
        }
    }
}

impl Default for AddonSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            api_key: SecretString::from(String::new()),
            list_name: String::new(),
            label: DEFAULT_LABEL.to_string(),
            default_checked: true,
            license_key: String::new(),
        }
    }
}

impl PartialEq for AddonSettings {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
            && self.api_key.expose_secret() == other.api_key.expose_secret()
            && self.list_name == other.list_name
            && self.label == other.label
            && self.default_checked == other.default_checked
            && self.license_key == other.license_key
    }
}

impl fmt::Debug for AddonSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonSettings")
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .field("list_name", &self.list_name)
            .field("label", &self.label)
            .field("default_checked", &self.default_checked)
            .field("license_key", &"[REDACTED]")
            .finish()
    }
}

/// Fields of the settings record, for single-value reads
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingField {
    Username,
    ApiKey,
    ListName,
    Label,
    DefaultChecked,
    LicenseKey,
}

impl AddonSettings {
    /// Read a single field as a string (`1`/`0` for the checkbox)
    pub fn get(&self, field: SettingField) -> String {
        match field {
            SettingField::Username => self.username.clone(),
            SettingField::ApiKey => self.api_key.expose_secret().to_string(),
            SettingField::ListName => self.list_name.clone(),
            SettingField::Label => self.label().to_string(),
            SettingField::DefaultChecked => u8::from(self.default_checked).to_string(),
            SettingField::LicenseKey => self.license_key.clone(),
        }
    }
}

/// License status, persisted apart from the settings record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LicenseStatus {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl LicenseStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }

    /// Parse the value reported by the licensing service
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "valid" => Self::Valid,
            "invalid" => Self::Invalid,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
