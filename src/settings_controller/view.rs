use std::fmt::Write;

use secrecy::ExposeSecret;

use crate::domain::{AddonSettings, LicenseStatus};

/// Everything the settings page shows
#[derive(Debug)]
pub struct SettingsViewModel {
    pub settings: AddonSettings,
    pub license_status: LicenseStatus,
    pub saved: bool,
    pub errors: Vec<String>,
    /// List dropdown computed from the persisted credentials
    pub lists_html: String,
    pub form_token: String,
    pub license_token: String,
}

/// Render the settings page
pub fn render_settings_page(view: &SettingsViewModel) -> String {
    let mut banners = String::new();
    for error in &view.errors {
        let _ = write!(
            banners,
            r#"<div class="error"><p><strong>{}</strong></p></div>"#,
            htmlescape::encode_minimal(error)
        );
    }
    if view.saved {
        banners.push_str(
            r#"<div id="message" class="updated"><p><strong>Your settings have been saved successfully!</strong></p></div>"#,
        );
    }

    let license_controls = if view.license_status == LicenseStatus::Valid {
        r#"<span class="madmimi-license-active">active</span> <button type="submit" name="license_deactivate" value="1">Deactivate License</button>"#
    } else {
        r#"<button type="submit" name="license_activate" value="1">Activate License</button>"#
    };

    let settings = &view.settings;
    format!(
        include_str!("settings.html"),
        banners = banners,
        form_token = view.form_token,
        license_token = view.license_token,
        license_key = htmlescape::encode_attribute(&settings.license_key),
        license_controls = license_controls,
        username = htmlescape::encode_attribute(&settings.username),
        api_key = htmlescape::encode_attribute(settings.api_key.expose_secret()),
        lists = view.lists_html,
        label = htmlescape::encode_attribute(settings.label()),
        checked = if settings.default_checked { " checked" } else { "" },
    )
}
