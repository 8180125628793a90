use chrono::{DateTime, Utc};
use secrecy::SecretBox;

use crate::authentication::Credentials;
use crate::domain::{SessionToken, UserId};

/// Error attached to a single login form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered collection of field errors, used to redisplay the login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Field name for errors that are not tied to a single input
    pub const BASE: &'static str = "base";

    /// Record an error against `field`
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Errors recorded against `field`
    pub fn on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A login attempt, or the authenticated session it turned into
///
/// Built empty to display the login form, built from submitted credentials on a login attempt,
/// and restored from storage when looking up the current session. Only the credential store
/// marks a session as authenticated, after validating it against stored credentials.
#[derive(Debug, Default)]
pub struct AuthSession {
    username: String,
    password: Option<SecretBox<String>>,
    token: Option<SessionToken>,
    user_id: Option<UserId>,
    created_at: Option<DateTime<Utc>>,
    errors: FieldErrors,
}

impl AuthSession {
    /// Empty, unauthenticated session for the login form
    pub fn new() -> Self {
        Self::default()
    }

    /// Unvalidated session carrying the submitted credentials
    pub fn from_credentials(credentials: Credentials) -> Self {
        Self {
            username: credentials.username,
            password: Some(credentials.password),
            ..Self::default()
        }
    }

    /// Authenticated session read back from a credential store
    pub fn restore(
        token: SessionToken,
        user_id: UserId,
        username: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            username,
            token: Some(token),
            user_id: Some(user_id),
            created_at: Some(created_at),
            ..Self::default()
        }
    }

    /// Mark the session as created against stored credentials
    pub fn authenticate(&mut self, token: SessionToken, user_id: UserId, created_at: DateTime<Utc>) {
        self.token = Some(token);
        self.user_id = Some(user_id);
        self.created_at = Some(created_at);
    }

    /// Hand the submitted password over to the store, which is the only place it is needed
    pub fn take_password(&mut self) -> Option<SecretBox<String>> {
        self.password.take()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub const fn token(&self) -> Option<SessionToken> {
        self.token
    }

    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Record a validation error to show on the login form
    pub fn add_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.add(field, message);
    }
}
