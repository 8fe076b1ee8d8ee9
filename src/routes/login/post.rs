use std::fmt;

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use actix_web_flash_messages::FlashMessage;
use secrecy::SecretString;

use crate::authentication::{validate_creds, AuthError, Credentials};
use crate::configuration::AdminSettings;
use crate::routes::helpers::error_chain_fmt;
use crate::session_state::TypedSession;
use crate::utils::see_other;

/// Web form data
#[derive(serde::Deserialize)]
pub struct FormData {
    username: String,
    password: SecretString,
}

/// Login error type
#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Authentication failed")]
    AuthError(#[source] anyhow::Error),
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LoginError {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }
}

/// Login POST handler
#[allow(clippy::future_not_send)]
#[tracing::instrument(
    skip(form, admin, session),
    fields(username=tracing::field::Empty)
)]
pub async fn login(
    form: web::Form<FormData>,
    admin: web::Data<AdminSettings>,
    session: TypedSession,
) -> Result<HttpResponse, InternalError<LoginError>> {
    let creds = Credentials {
        username: form.0.username,
        password: form.0.password,
    };
    tracing::Span::current().record("username", tracing::field::display(&creds.username));

    match validate_creds(creds, &admin).await {
        Ok(username) => {
            session.renew();
            session
                .insert_admin(&username)
                .map_err(|e| login_redirect(LoginError::UnexpectedError(e.into())))?;
            Ok(see_other("/admin/settings"))
        }
        Err(e) => {
            let e = match e {
                AuthError::InvalidCredentials(_) => LoginError::AuthError(e.into()),
                AuthError::UnexpectedError(_) => LoginError::UnexpectedError(e.into()),
            };
            Err(login_redirect(e))
        }
    }
}

/// Redirect to the login form with the error as a flash message
fn login_redirect(e: LoginError) -> InternalError<LoginError> {
    FlashMessage::error(e.to_string()).send();
    InternalError::from_response(e, see_other("/login"))
}
