use std::time;

use chrono::NaiveDateTime;
use reqwest::Client;
use url::Url;

use crate::domain::LicenseStatus;

/// Reasons the licensing service gives for refusing an activation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LicenseRejection {
    Expired(Option<String>),
    Revoked,
    Missing,
    Inactive,
    ItemNameMismatch(String),
    NoActivationsLeft,
    Other,
}

/// License call error type
#[derive(thiserror::Error, Debug)]
pub enum LicenseError {
    #[error("An error occurred, please try again.")]
    Transport(#[source] reqwest::Error),
    #[error("An error occurred, please try again.")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("{}", rejection_message(.0))]
    Rejected(LicenseRejection),
}

fn rejection_message(rejection: &LicenseRejection) -> String {
    match rejection {
        LicenseRejection::Expired(Some(date)) => format!("Your license key expired on {date}."),
        LicenseRejection::Expired(None) => "Your license key has expired.".into(),
        LicenseRejection::Revoked => "Your license key has been disabled.".into(),
        LicenseRejection::Missing => "Invalid license.".into(),
        LicenseRejection::Inactive => "Your license is not active for this URL.".into(),
        LicenseRejection::ItemNameMismatch(item) => {
            format!("This appears to be an invalid license key for {item}.")
        }
        LicenseRejection::NoActivationsLeft => {
            "Your license key has reached its activation limit.".into()
        }
        LicenseRejection::Other => "An error occurred, please try again.".into(),
    }
}

/// Licensing service reply
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LicenseResponse {
    success: Option<bool>,
    license: Option<String>,
    error: Option<String>,
    expires: Option<String>,
}

/// Outcome of a deactivation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deactivation {
    Deactivated,
    Failed,
}

/// Licensing service client
#[derive(Clone, Debug)]
pub struct LicenseClient {
    http_client: Client,
    base_url: Url,
    item_name: String,
    site_url: String,
}

impl LicenseClient {
    pub fn new(base_url: Url, item_name: String, site_url: String, timeout: time::Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            item_name,
            site_url,
        }
    }

    /// Activate a license for this site and return the resulting status
    #[tracing::instrument(name = "Activate license", skip(self, license))]
    pub async fn activate(&self, license: &str) -> Result<LicenseStatus, LicenseError> {
        let reply = self.call("activate_license", license).await?;
        if reply.success == Some(false) {
            return Err(LicenseError::Rejected(self.rejection(&reply)));
        }
        Ok(reply
            .license
            .as_deref()
            .map_or(LicenseStatus::Unknown, LicenseStatus::parse))
    }

    /// Release the license held by this site
    #[tracing::instrument(name = "Deactivate license", skip(self, license))]
    pub async fn deactivate(&self, license: &str) -> Result<Deactivation, LicenseError> {
        let reply = self.call("deactivate_license", license).await?;
        if reply.license.as_deref() == Some("deactivated") {
            Ok(Deactivation::Deactivated)
        } else {
            Ok(Deactivation::Failed)
        }
    }

    async fn call(&self, action: &str, license: &str) -> Result<LicenseResponse, LicenseError> {
        let response = self
            .http_client
            .post(self.base_url.clone())
            .form(&[
                ("edd_action", action),
                ("license", license.trim()),
                ("item_name", self.item_name.as_str()),
                ("url", self.site_url.as_str()),
            ])
            .send()
            .await
            .map_err(LicenseError::Transport)?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(LicenseError::UnexpectedStatus(response.status()));
        }

        // An unreadable body is treated like an empty reply
        Ok(response.json().await.unwrap_or_default())
    }

    fn rejection(&self, reply: &LicenseResponse) -> LicenseRejection {
        match reply.error.as_deref() {
            Some("expired") => LicenseRejection::Expired(reply.expires.as_deref().map(format_expiry)),
            Some("revoked") => LicenseRejection::Revoked,
            Some("missing") => LicenseRejection::Missing,
            Some("invalid" | "site_inactive") => LicenseRejection::Inactive,
            Some("item_name_mismatch") => LicenseRejection::ItemNameMismatch(self.item_name.clone()),
            Some("no_activations_left") => LicenseRejection::NoActivationsLeft,
            _ => LicenseRejection::Other,
        }
    }
}

/// Render the service's expiry timestamp as a human-readable date
fn format_expiry(expires: &str) -> String {
    NaiveDateTime::parse_from_str(expires, "%Y-%m-%d %H:%M:%S")
        .map_or_else(|_| expires.to_string(), |d| d.format("%B %-d, %Y").to_string())
}
