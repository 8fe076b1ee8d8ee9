use actix_web::http::header::ContentType;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};
use secrecy::SecretString;
use url::form_urlencoded;

use crate::authentication::AdminUser;
use crate::settings_controller::{
    render_settings_page, LicenseAction, SettingsController, SettingsError, SettingsForm,
};
use crate::utils::{err500, see_other};

/// Web form data
#[derive(serde::Deserialize)]
pub struct FormData {
    #[serde(default)]
    csrf_token: String,
    settings_form: Option<String>,
    username: Option<String>,
    api_key: Option<SecretString>,
    list_name: Option<String>,
    label: Option<String>,
    default_checked: Option<String>,
    license_key: Option<String>,
    license_activate: Option<String>,
    license_deactivate: Option<String>,
    license_token: Option<String>,
}

impl FormData {
    /// Split the submission into the settings form and its token
    ///
    /// An unchecked checkbox is only read as "off" when the full settings
    /// form was submitted.
    fn into_parts(self) -> (SettingsForm, String) {
        let default_checked = match (self.default_checked, self.settings_form) {
            (Some(_), _) => Some(true),
            (None, Some(_)) => Some(false),
            (None, None) => None,
        };
        let license_action = if self.license_activate.is_some() {
            Some(LicenseAction::Activate)
        } else if self.license_deactivate.is_some() {
            Some(LicenseAction::Deactivate)
        } else {
            None
        };

        let form = SettingsForm {
            username: self.username,
            api_key: self.api_key,
            list_name: self.list_name,
            label: self.label,
            default_checked,
            license_key: self.license_key,
            license_action,
            license_token: self.license_token,
        };
        (form, self.csrf_token)
    }
}

/// Settings page POST handler
#[tracing::instrument(name = "Save settings", skip_all, fields(admin = %*admin))]
pub async fn save_settings(
    form: web::Form<FormData>,
    controller: web::Data<SettingsController>,
    admin: ReqData<AdminUser>,
) -> actix_web::Result<HttpResponse> {
    let admin = admin.into_inner();
    let (form, token) = form.into_inner().into_parts();

    match controller.apply(&admin, form, &token).await {
        Ok(view) => Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(render_settings_page(&view))),
        Err(SettingsError::License(e)) => {
            tracing::warn!(error.message = %e, "License call failed");
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("sl_activation", "false")
                .append_pair("message", &e.to_string())
                .finish();
            Ok(see_other(&format!("/admin/settings?{query}")))
        }
        Err(e @ SettingsError::Store(_)) => Err(err500(e)),
    }
}
