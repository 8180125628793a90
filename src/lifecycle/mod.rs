//! Login session lifecycle: show the login form, attempt a login, log out.
//!
//! The lifecycle owns no state. Credential checking and session persistence belong to the
//! [`CredentialStore`], and per-request state travels in a [`RequestContext`] that is passed in
//! and returned, so every operation can be exercised without an HTTP stack.

mod context;

use std::fmt;

use crate::authentication::{AuthError, CredentialStore, Credentials};
use crate::domain::AuthSession;
use crate::utils::error_chain_fmt;

pub use context::{Notice, NoticeLevel, RequestContext};

/// Notice shown after a successful login
pub const LOGGED_IN_NOTICE: &str = "Successfully logged in.";

/// Notice shown after a logout
pub const LOGGED_OUT_NOTICE: &str = "Successfully logged out.";

/// Well-known application locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// Where a login lands when no `return_to` was recorded
    pub home: String,
    /// Where a logout lands
    pub root: String,
    /// The login form
    pub login: String,
}

impl Default for Locations {
    fn default() -> Self {
        Self {
            home: "/home".to_string(),
            root: "/".to_string(),
            login: "/sessions/new".to_string(),
        }
    }
}

/// What the caller should do after a login attempt
#[derive(Debug)]
pub enum Outcome {
    /// Redirect to the target location
    Redirect(String),
    /// Display the login form again, with the rejected session and its field errors
    RenderForm(AuthSession),
}

/// Result of a login attempt, together with the updated request context
#[derive(Debug)]
pub struct Handled {
    pub outcome: Outcome,
    pub context: RequestContext,
}

/// Result of a logout: always a redirect
#[derive(Debug)]
pub struct Redirection {
    pub target: String,
    pub context: RequestContext,
}

/// Login error type
///
/// Rejected credentials are not an error, see [`Outcome::RenderForm`].
#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Logout error type
#[derive(thiserror::Error)]
pub enum LogoutError {
    #[error("You are not logged in.")]
    NoCurrentSession,
    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for LogoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Login/logout handler over a credential store
pub struct SessionLifecycle<S> {
    store: S,
    locations: Locations,
}

impl<S: CredentialStore> SessionLifecycle<S> {
    pub const fn new(store: S, locations: Locations) -> Self {
        Self { store, locations }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn locations(&self) -> &Locations {
        &self.locations
    }

    /// Empty, unauthenticated session to display the login form
    pub fn show_login_form(&self) -> AuthSession {
        AuthSession::new()
    }

    /// Attempt to log in with `credentials`
    ///
    /// On success the context loses its `return_to`, gains the new session token and a notice,
    /// and the caller is sent to the old `return_to` (or home). A login session the context
    /// already named is destroyed. On rejection the context is returned untouched.
    #[tracing::instrument(
        name = "Attempt login",
        skip(self, credentials, context),
        fields(username = %credentials.username, user_id = tracing::field::Empty)
    )]
    pub async fn attempt_login(
        &self,
        credentials: Credentials,
        mut context: RequestContext,
    ) -> Result<Handled, LoginError> {
        let target = context
            .return_to()
            .map_or_else(|| self.locations.home.clone(), ToOwned::to_owned);

        let mut session = AuthSession::from_credentials(credentials);
        match self.store.create(&mut session).await {
            Ok(()) => {
                let token = session.token().ok_or_else(|| {
                    anyhow::anyhow!("The credential store accepted a session without a token")
                })?;
                if let Some(user_id) = session.user_id() {
                    tracing::Span::current().record("user_id", tracing::field::display(&user_id));
                }

                // Logging in again replaces the login session the context already held
                if let Some(previous) = context.session_token().filter(|&t| t != token) {
                    if let Some(stale) = self.store.find_current(previous).await? {
                        self.store.destroy(stale).await?;
                    }
                }

                context.clear_return_to();
                context.authenticate(token);
                context.set_flash(Notice::info(LOGGED_IN_NOTICE));
                Ok(Handled {
                    outcome: Outcome::Redirect(target),
                    context,
                })
            }
            Err(AuthError::InvalidCredentials(e)) => {
                tracing::info!(error = %e, "Login rejected");
                Ok(Handled {
                    outcome: Outcome::RenderForm(session),
                    context,
                })
            }
            Err(AuthError::UnexpectedError(e)) => Err(e.into()),
        }
    }

    /// Destroy the current login session and reset all session state
    ///
    /// The current session is the one named by the context's token. A missing token, or a token
    /// the store no longer knows, is reported as [`LogoutError::NoCurrentSession`].
    #[tracing::instrument(name = "Logout", skip(self, context))]
    pub async fn logout(&self, mut context: RequestContext) -> Result<Redirection, LogoutError> {
        let token = context
            .session_token()
            .ok_or(LogoutError::NoCurrentSession)?;
        let session = self
            .store
            .find_current(token)
            .await?
            .ok_or(LogoutError::NoCurrentSession)?;

        self.store.destroy(session).await?;

        context.reset_all();
        context.set_flash(Notice::info(LOGGED_OUT_NOTICE));
        Ok(Redirection {
            target: self.locations.root.clone(),
            context,
        })
    }

    /// The authenticated session named by the context, if the store still knows it
    pub async fn current_session(
        &self,
        context: &RequestContext,
    ) -> anyhow::Result<Option<AuthSession>> {
        match context.session_token() {
            Some(token) => self.store.find_current(token).await,
            None => Ok(None),
        }
    }
}
