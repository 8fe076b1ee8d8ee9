//! Endpoints the host platform calls during registration and checkout.
//!
//! They answer 200 whatever happens with Mad Mimi, so an opt-in can never
//! break the flow that triggered it.

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

use crate::optin_gate::{OptinGate, RegistrationForm};

/// Guest checkout data
#[derive(serde::Deserialize)]
pub struct GuestCheckout {
    #[serde(default)]
    email: String,
}

/// Registration field to decorate
#[derive(serde::Deserialize)]
pub struct RegistrationField {
    #[serde(default)]
    html: String,
}

/// New user registration hook
#[tracing::instrument(name = "Registration hook", skip_all)]
pub async fn register_hook(
    form: web::Form<RegistrationForm>,
    gate: web::Data<OptinGate>,
) -> HttpResponse {
    let outcome = gate.on_register(&form).await;
    tracing::info!(?outcome, "Registration opt-in processed");
    HttpResponse::Ok().finish()
}

/// Guest checkout hook
#[tracing::instrument(name = "Guest checkout hook", skip_all)]
pub async fn guest_checkout_hook(
    form: web::Form<GuestCheckout>,
    gate: web::Data<OptinGate>,
) -> HttpResponse {
    let outcome = gate.on_guest_checkout(&form.email).await;
    tracing::info!(?outcome, "Guest checkout opt-in processed");
    HttpResponse::Ok().finish()
}

/// Opt-in checkbox markup for the checkout form
pub async fn optin_markup(gate: web::Data<OptinGate>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(gate.render_optin_markup().await)
}

/// Registration field with the opt-in checkbox appended
pub async fn registration_field(
    form: web::Form<RegistrationField>,
    gate: web::Data<OptinGate>,
) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(gate.append_optin(&form.html).await)
}
