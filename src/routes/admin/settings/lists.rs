use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use secrecy::SecretString;

use crate::settings_controller::SettingsController;

/// Credentials typed into the settings form, possibly unsaved
#[derive(serde::Deserialize)]
pub struct FormData {
    #[serde(default)]
    username: String,
    api_key: Option<SecretString>,
}

/// List dropdown refresh handler
///
/// Answers 429 with an empty body while another refresh is running.
#[tracing::instrument(name = "Refresh list dropdown", skip_all)]
pub async fn refresh_lists(
    form: web::Form<FormData>,
    controller: web::Data<SettingsController>,
) -> HttpResponse {
    let FormData { username, api_key } = form.into_inner();
    let api_key = api_key.unwrap_or_else(|| SecretString::from(String::new()));

    match controller.refresh_lists(&username, &api_key).await {
        Some(html) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(html),
        None => HttpResponse::TooManyRequests().finish(),
    }
}
