use std::fmt;
use std::ops::Deref;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::{ErrorUnauthorized, InternalError};
use actix_web::middleware::Next;
use actix_web::{web, FromRequest, HttpMessage};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::configuration::HookSettings;
use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

/// Header carrying the shared hook token
pub const HOOK_TOKEN_HEADER: &str = "X-Hook-Token";

/// Logged in administrator
#[derive(Clone, Debug)]
pub struct AdminUser(String);

impl Deref for AdminUser {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reject users that are not logged in
#[allow(clippy::future_not_send)]
pub async fn reject_logged_out_users(
    mut req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> actix_web::Result<ServiceResponse<impl MessageBody>> {
    let session = {
        let (http_request, payload) = req.parts_mut();
        TypedSession::from_request(http_request, payload).await
    }?;

    if let Some(admin) = session.get_admin().map_err(err500)? {
        req.extensions_mut().insert(AdminUser(admin));
        next.call(req).await
    } else {
        let response = see_other("/login");
        let e = anyhow::anyhow!("The user is not logged in");
        Err(InternalError::from_response(e, response).into())
    }
}

/// Reject hook calls that do not carry the shared token
#[allow(clippy::future_not_send)]
pub async fn require_hook_token(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> actix_web::Result<ServiceResponse<impl MessageBody>> {
    let authorized = match (
        req.app_data::<web::Data<HookSettings>>(),
        req.headers().get(HOOK_TOKEN_HEADER),
    ) {
        (Some(hooks), Some(token)) => token_matches(token.as_bytes(), &hooks.token),
        _ => false,
    };

    if authorized {
        next.call(req).await
    } else {
        tracing::warn!("Rejected a hook call without a valid token");
        Err(ErrorUnauthorized("Missing or invalid hook token"))
    }
}

/// Compare a presented token with the configured one in constant time
fn token_matches(presented: &[u8], expected: &SecretString) -> bool {
    let tag = |key: &[u8]| {
        let mut mac =
            <Hmac<Sha256> as Mac>::new_from_slice(key).expect("HMAC can take a key of any size");
        mac.update(HOOK_TOKEN_HEADER.as_bytes());
        mac
    };
    let expected_tag = tag(expected.expose_secret().as_bytes()).finalize().into_bytes();
    tag(presented).verify_slice(&expected_tag).is_ok()
}
