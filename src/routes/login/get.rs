use std::fmt::Write;

use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use actix_web_flash_messages::IncomingFlashMessages;

/// Login GET handler
pub async fn login_form(flash_messages: IncomingFlashMessages) -> HttpResponse {
    let mut msg_html = String::new();
    for m in flash_messages.iter() {
        let _ = writeln!(
            msg_html,
            "<p><i>{}</i></p>",
            htmlescape::encode_minimal(m.content())
        );
    }

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(include_str!("login.html"), msg_html))
}
