use std::future::{ready, Ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::SessionToken;
use crate::lifecycle::RequestContext;

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
    const SESSION_TOKEN_KEY: &'static str = "session_token";
    const RETURN_TO_KEY: &'static str = "return_to";

    /// Renew the session key
    pub fn renew(&self) {
        self.0.renew();
    }

    /// Insert the login session token into session
    pub fn insert_session_token(&self, token: SessionToken) -> Result<(), SessionInsertError> {
        self.0.insert(Self::SESSION_TOKEN_KEY, token)
    }

    /// Get the login session token from session
    pub fn get_session_token(&self) -> Result<Option<SessionToken>, SessionGetError> {
        self.0.get(Self::SESSION_TOKEN_KEY)
    }

    /// Remember where to go after a successful login
    pub fn insert_return_to(&self, location: &str) -> Result<(), SessionInsertError> {
        self.0.insert(Self::RETURN_TO_KEY, location)
    }

    pub fn get_return_to(&self) -> Result<Option<String>, SessionGetError> {
        self.0.get(Self::RETURN_TO_KEY)
    }

    /// Build the per-request context from the session state
    pub fn context(&self) -> Result<RequestContext, SessionGetError> {
        Ok(RequestContext::new(
            self.get_return_to()?,
            self.get_session_token()?,
        ))
    }

    /// Write a context returned by the session lifecycle back into the session
    pub fn apply(&self, context: &RequestContext) -> Result<(), SessionInsertError> {
        if context.is_reset() {
            self.0.purge();
            return Ok(());
        }

        match context.return_to() {
            Some(location) => self.insert_return_to(location)?,
            None => {
                self.0.remove(Self::RETURN_TO_KEY);
            }
        }
        match context.session_token() {
            Some(token) => self.insert_session_token(token)?,
            None => {
                self.0.remove(Self::SESSION_TOKEN_KEY);
            }
        }

        Ok(())
    }

    /// Purge session data to logout
    pub fn logout(self) {
        self.0.purge();
    }
}
