//! Registration and guest checkout opt-in.
//!
//! Opting in must never block the surrounding flow: every failure ends in a
//! log line and an [`OptinOutcome`], never in an error.

use std::sync::Arc;

use crate::domain::{AddonSettings, EmailAddress, SubscriberRecord};
use crate::madmimi_client::MadMimiClient;
use crate::settings_store::SettingsStore;

/// Name of the opt-in checkbox in registration forms
pub const SIGNUP_FIELD: &str = "madmimi-signup-field";

/// Registration fields relevant to the opt-in
#[derive(Debug, Default, serde::Deserialize)]
pub struct RegistrationForm {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "madmimi-signup-field")]
    pub signup: Option<String>,
}

/// Why no subscriber was sent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Unconfigured,
    NotOptedIn,
    InvalidEmail,
    SettingsUnavailable,
}

/// What became of an opt-in event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptinOutcome {
    Skipped(SkipReason),
    Submitted,
    /// Mad Mimi did not accept the subscriber, the failure was logged
    Failed,
}

/// Decides whether checkout and registration events add a subscriber
pub struct OptinGate {
    store: Arc<dyn SettingsStore>,
    client: MadMimiClient,
}

impl OptinGate {
    pub fn new(store: Arc<dyn SettingsStore>, client: MadMimiClient) -> Self {
        Self { store, client }
    }

    /// Handle a new user registration
    #[tracing::instrument(name = "Registration opt-in", skip(self, form))]
    pub async fn on_register(&self, form: &RegistrationForm) -> OptinOutcome {
        let settings = match self.configured_settings().await {
            Ok(settings) => settings,
            Err(reason) => return OptinOutcome::Skipped(reason),
        };
        if form.signup.is_none() {
            return OptinOutcome::Skipped(SkipReason::NotOptedIn);
        }
        let Some(Ok(email)) = form.email.as_deref().map(EmailAddress::parse) else {
            return OptinOutcome::Skipped(SkipReason::InvalidEmail);
        };

        let record = SubscriberRecord::registered(
            &settings.list_name,
            email,
            form.first_name.as_deref(),
            form.last_name.as_deref(),
        );
        self.submit(&settings, &record).await
    }

    /// Handle a guest checkout, whose email the platform already verified
    #[tracing::instrument(name = "Guest checkout opt-in", skip(self, email))]
    pub async fn on_guest_checkout(&self, email: &str) -> OptinOutcome {
        let settings = match self.configured_settings().await {
            Ok(settings) => settings,
            Err(reason) => return OptinOutcome::Skipped(reason),
        };
        if email.trim().is_empty() {
            return OptinOutcome::Skipped(SkipReason::InvalidEmail);
        }

        let record = SubscriberRecord::guest(&settings.list_name, email);
        self.submit(&settings, &record).await
    }

    /// Opt-in checkbox markup, empty unless the add-on is configured
    pub async fn render_optin_markup(&self) -> String {
        self.configured_settings()
            .await
            .map(|settings| optin_markup(&settings))
            .unwrap_or_default()
    }

    /// Append the opt-in checkbox to a registration form field
    pub async fn append_optin(&self, field_html: &str) -> String {
        format!("{field_html}{}", self.render_optin_markup().await)
    }

    async fn configured_settings(&self) -> Result<AddonSettings, SkipReason> {
        match self.store.load().await {
            Ok(settings) if settings.is_configured() => Ok(settings),
            Ok(_) => Err(SkipReason::Unconfigured),
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to load the add-on settings"
                );
                Err(SkipReason::SettingsUnavailable)
            }
        }
    }

    async fn submit(&self, settings: &AddonSettings, record: &SubscriberRecord) -> OptinOutcome {
        match self
            .client
            .add_user(&settings.username, &settings.api_key, record)
            .await
        {
            Ok(()) => {
                tracing::info!("Subscriber sent to Mad Mimi");
                OptinOutcome::Submitted
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to add the subscriber to Mad Mimi"
                );
                OptinOutcome::Failed
            }
        }
    }
}

fn optin_markup(settings: &AddonSettings) -> String {
    let (value, checked) = if settings.default_checked {
        ("1", r#" checked="checked""#)
    } else {
        ("0", "")
    };
    format!(
        r#"<div class="madmimi-signup" style="clear:both;"><label for="{SIGNUP_FIELD}"><input type="checkbox" id="{SIGNUP_FIELD}" name="{SIGNUP_FIELD}" value="{value}"{checked} />{}</label></div>"#,
        htmlescape::encode_minimal(settings.label())
    )
}
