use chrono::{DateTime, Duration, Utc};

use crate::authentication::AuthError;
use crate::domain::{AuthSession, SessionToken};

/// Login session lifetime used when none is configured
pub fn default_session_ttl() -> Duration {
    Duration::hours(24)
}

/// Whether a login session created at `created_at` has outlived `ttl`
pub(crate) fn is_expired(created_at: DateTime<Utc>, ttl: Duration) -> bool {
    created_at + ttl <= Utc::now()
}

/// Validates login attempts and owns the persisted login sessions
///
/// Implementations decide what valid credentials look like. A rejected attempt is reported as
/// [`AuthError::InvalidCredentials`] with the reasons recorded on the session as field errors.
#[allow(async_fn_in_trait)]
pub trait CredentialStore: Send + Sync + 'static {
    /// Validate the credentials carried by `session` and, if they are valid, persist it and mark
    /// it as authenticated
    async fn create(&self, session: &mut AuthSession) -> Result<(), AuthError>;

    /// Look up the login session identified by `token`; expired sessions are not found
    async fn find_current(&self, token: SessionToken) -> anyhow::Result<Option<AuthSession>>;

    /// Discard a login session; destroying an unknown session is not an error
    async fn destroy(&self, session: AuthSession) -> anyhow::Result<()>;
}
