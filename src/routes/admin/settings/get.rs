use actix_web::http::header::ContentType;
use actix_web::web::ReqData;
use actix_web::{web, HttpResponse};

use crate::authentication::AdminUser;
use crate::settings_controller::{render_settings_page, SettingsController};
use crate::utils::err500;

/// Query parameters set by a failed license call
#[derive(serde::Deserialize)]
pub struct QueryParams {
    sl_activation: Option<String>,
    message: Option<String>,
}

/// Settings page GET handler
#[tracing::instrument(name = "Show settings", skip_all, fields(admin = %*admin))]
pub async fn settings_page(
    controller: web::Data<SettingsController>,
    admin: ReqData<AdminUser>,
    query: web::Query<QueryParams>,
) -> actix_web::Result<HttpResponse> {
    let admin = admin.into_inner();
    let mut view = controller.view(&admin).await.map_err(err500)?;

    let QueryParams {
        sl_activation,
        message,
    } = query.into_inner();
    if sl_activation.as_deref() == Some("false") {
        view.errors
            .push(message.unwrap_or_else(|| "An error occurred, please try again.".into()));
    }

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(render_settings_page(&view)))
}
