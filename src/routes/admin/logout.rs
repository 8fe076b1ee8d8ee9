use actix_web::HttpResponse;
use actix_web_flash_messages::FlashMessage;

use crate::session_state::TypedSession;
use crate::utils::see_other;

/// Logout handler
#[allow(clippy::future_not_send)]
pub async fn logout(session: TypedSession) -> HttpResponse {
    session.logout();
    FlashMessage::info("You have successfully logged out").send();
    see_other("/login")
}
