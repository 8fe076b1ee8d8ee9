use std::future::{ready, Ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

/// Session type
pub struct TypedSession(Session);

impl FromRequest for TypedSession {
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}

impl TypedSession {
    const ADMIN_KEY: &'static str = "admin";

    /// Renew the session key
    pub fn renew(&self) {
        self.0.renew();
    }

    /// Remember the logged in administrator
    pub fn insert_admin(&self, username: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::ADMIN_KEY, username)
    }

    pub fn get_admin(&self) -> Result<Option<String>, SessionGetError> {
        self.0.get(Self::ADMIN_KEY)
    }

    /// Purge session data to logout
    pub fn logout(self) {
        self.0.purge();
    }
}
