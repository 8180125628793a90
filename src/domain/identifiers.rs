use std::fmt;
use std::ops::Deref;

use uuid::Uuid;

/// Identifier of a stored user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing `user_id`
    pub const fn new(user_id: Uuid) -> Self {
        Self(user_id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for UserId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Opaque token identifying a persisted login session
///
/// The token is what the cookie session carries around as the authentication marker: the
/// credential store resolves it back to the login session and its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a token read back from storage
    pub const fn new(token: Uuid) -> Self {
        Self(token)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for SessionToken {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
