mod auth_session;
mod identifiers;

pub use auth_session::{AuthSession, FieldError, FieldErrors};
pub use identifiers::{SessionToken, UserId};
