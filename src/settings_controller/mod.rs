//! Admin settings: form submission, license side-calls and list refreshes.

mod form;
mod refresh;
mod view;

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::AddonSettings;
use crate::license_client::{Deactivation, LicenseClient, LicenseError};
use crate::list_directory::{render_dropdown, ListDirectory};
use crate::nonce::{NonceAction, NonceIssuer};
use crate::settings_store::{SettingsStore, StoreError};

pub use form::{LicenseAction, SettingsForm};
pub use refresh::{RefreshGuard, RefreshPermit};
pub use view::{render_settings_page, SettingsViewModel};

/// Shown when a form token does not verify
pub const NONCE_MISMATCH: &str =
    "Are you sure you want to do this? The form nonces do not match. Please try again.";
/// Shown when the settings record cannot be written
pub const SAVE_FAILED: &str = "Your settings could not be saved. Please try again.";

/// Settings submission error type
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// The licensing call failed, the caller redirects with the message
    #[error(transparent)]
    License(#[from] LicenseError),
    #[error("Failed to read the settings")]
    Store(#[from] StoreError),
}

/// Settings page logic
pub struct SettingsController {
    store: Arc<dyn SettingsStore>,
    lists: ListDirectory,
    license: LicenseClient,
    nonces: NonceIssuer,
    refresh_guard: RefreshGuard,
}

impl SettingsController {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        lists: ListDirectory,
        license: LicenseClient,
        nonces: NonceIssuer,
    ) -> Self {
        Self {
            store,
            lists,
            license,
            nonces,
            refresh_guard: RefreshGuard::default(),
        }
    }

    /// Build the settings page for `admin` from the persisted state
    #[tracing::instrument(name = "Build settings view", skip(self))]
    pub async fn view(&self, admin: &str) -> Result<SettingsViewModel, StoreError> {
        let settings = self.store.load().await?;
        let license_status = self.store.license_status().await?;
        let result = self
            .lists
            .fetch_lists(&settings.username, &settings.api_key)
            .await;
        let lists_html = render_dropdown(&result, &settings.list_name);

        Ok(SettingsViewModel {
            lists_html,
            license_status,
            settings,
            saved: false,
            errors: Vec::new(),
            form_token: self.nonces.issue(NonceAction::SettingsForm, admin),
            license_token: self.nonces.issue(NonceAction::License, admin),
        })
    }

    /// Validate and persist a settings submission, then run the requested
    /// license action
    #[tracing::instrument(name = "Apply settings", skip(self, form, token))]
    pub async fn apply(
        &self,
        admin: &str,
        form: SettingsForm,
        token: &str,
    ) -> Result<SettingsViewModel, SettingsError> {
        if !self.nonces.verify(NonceAction::SettingsForm, admin, token) {
            tracing::warn!("Rejected a settings submission with a bad form token");
            return self.view_with(admin, false, vec![NONCE_MISMATCH.into()]).await;
        }

        let merged = match self.persist(&form).await {
            Ok(merged) => merged,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to save the settings"
                );
                return self.view_with(admin, false, vec![SAVE_FAILED.into()]).await;
            }
        };

        let mut errors = Vec::new();
        if let Some(action) = form.license_action {
            let token = form.license_token.as_deref().unwrap_or_default();
            if self.nonces.verify(NonceAction::License, admin, token) {
                if let Err(e) = self.run_license_action(action, &merged.license_key).await? {
                    tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "Failed to store the license status"
                    );
                    errors.push(SAVE_FAILED.into());
                }
            } else {
                tracing::warn!("Skipped a license action with a bad license token");
                errors.push(NONCE_MISMATCH.into());
            }
        }

        self.view_with(admin, true, errors).await
    }

    /// Render the list dropdown for unsaved credentials
    ///
    /// Returns `None` while another refresh is in flight.
    #[tracing::instrument(name = "Refresh lists", skip(self, api_key))]
    pub async fn refresh_lists(&self, username: &str, api_key: &SecretString) -> Option<String> {
        let Some(_permit) = self.refresh_guard.try_acquire() else {
            tracing::info!("Suppressed an overlapping list refresh");
            return None;
        };
        let selected = self.store.load().await.map(|s| s.list_name).unwrap_or_default();
        let result = self.lists.fetch_lists(username, api_key).await;
        Some(render_dropdown(&result, &selected))
    }

    async fn persist(&self, form: &SettingsForm) -> Result<AddonSettings, StoreError> {
        let current = self.store.load().await?;
        let merged = form.merge_into(&current);
        self.store.save(&merged).await?;
        Ok(merged)
    }

    /// Call the licensing service; the outer error aborts the request, the
    /// inner one is a failure to record the outcome
    async fn run_license_action(
        &self,
        action: LicenseAction,
        license_key: &str,
    ) -> Result<Result<(), StoreError>, LicenseError> {
        match action {
            LicenseAction::Activate => {
                let status = self.license.activate(license_key).await?;
                tracing::info!(license_status = %status, "License activated");
                Ok(self.store.set_license_status(status).await)
            }
            LicenseAction::Deactivate => match self.license.deactivate(license_key).await? {
                Deactivation::Deactivated => {
                    tracing::info!("License deactivated");
                    Ok(self.store.clear_license_status().await)
                }
                Deactivation::Failed => Ok(Ok(())),
            },
        }
    }

    async fn view_with(
        &self,
        admin: &str,
        saved: bool,
        errors: Vec<String>,
    ) -> Result<SettingsViewModel, SettingsError> {
        let mut view = self.view(admin).await?;
        view.saved = saved;
        view.errors = errors;
        Ok(view)
    }
}
