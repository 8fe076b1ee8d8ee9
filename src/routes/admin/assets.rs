use actix_web::HttpResponse;

/// Settings page script, refreshes the list dropdown when credentials change
pub async fn admin_js() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(include_str!("admin.js"))
}
