use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretBox};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::authentication::credentials::{take_present_password, verify_credentials};
use crate::authentication::store::is_expired;
use crate::authentication::{
    compute_password_hash, default_session_ttl, AuthError, CredentialStore,
};
use crate::domain::{AuthSession, SessionToken, UserId};
use crate::telemetry::spawn_blocking_with_tracing;

struct StoredUser {
    user_id: UserId,
    password_hash: String,
}

struct LoginRecord {
    user_id: UserId,
    username: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    users: RwLock<HashMap<String, StoredUser>>,
    sessions: RwLock<HashMap<SessionToken, LoginRecord>>,
}

/// Process-local credential store
///
/// Same semantics as the Postgres store, without a database. Clones share the same users and
/// sessions.
#[derive(Clone)]
pub struct InMemoryCredentialStore {
    inner: Arc<Inner>,
    session_ttl: Duration,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            session_ttl: default_session_ttl(),
        }
    }
}

impl InMemoryCredentialStore {
    /// Set how long login sessions stay valid
    #[must_use]
    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Add a user, replacing any existing user with the same username
    #[tracing::instrument(name = "Add user", skip(self, password))]
    pub async fn add_user(
        &self,
        username: &str,
        password: SecretBox<String>,
    ) -> anyhow::Result<UserId> {
        let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(&password))
            .await
            .context("Failed to spawn blocking task")??;

        let user_id = UserId::new(Uuid::new_v4());
        self.inner.users.write().await.insert(
            username.to_string(),
            StoredUser {
                user_id,
                password_hash: password_hash.expose_secret().clone(),
            },
        );
        Ok(user_id)
    }

    /// Number of stored login sessions
    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Remove expired login sessions, returning how many were removed
    #[tracing::instrument(name = "Purge expired login sessions", skip(self))]
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !is_expired(record.created_at, self.session_ttl));
        before - sessions.len()
    }

    /// Destroy every login session of `user_id`, returning how many were removed
    #[tracing::instrument(name = "Revoke user sessions", skip(self))]
    pub async fn revoke_user_sessions(&self, user_id: UserId) -> usize {
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.user_id != user_id);
        before - sessions.len()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    #[tracing::instrument(
        name = "Create login session",
        skip(self, session),
        fields(username = %session.username(), user_id = tracing::field::Empty)
    )]
    async fn create(&self, session: &mut AuthSession) -> Result<(), AuthError> {
        let password = take_present_password(session)?;
        let stored = self
            .inner
            .users
            .read()
            .await
            .get(session.username())
            .map(|user| {
                (
                    user.user_id,
                    SecretBox::new(Box::new(user.password_hash.clone())),
                )
            });
        let user_id = verify_credentials(session, stored, password).await?;
        tracing::Span::current().record("user_id", tracing::field::display(&user_id));

        self.purge_expired().await;
        let token = SessionToken::generate();
        let created_at = Utc::now();
        self.inner.sessions.write().await.insert(
            token,
            LoginRecord {
                user_id,
                username: session.username().to_string(),
                created_at,
            },
        );

        session.authenticate(token, user_id, created_at);
        Ok(())
    }

    #[tracing::instrument(name = "Find login session", skip(self))]
    async fn find_current(&self, token: SessionToken) -> anyhow::Result<Option<AuthSession>> {
        let mut sessions = self.inner.sessions.write().await;
        let Some(record) = sessions.get(&token) else {
            return Ok(None);
        };
        if is_expired(record.created_at, self.session_ttl) {
            tracing::info!("Login session has expired");
            sessions.remove(&token);
            return Ok(None);
        }

        Ok(Some(AuthSession::restore(
            token,
            record.user_id,
            record.username.clone(),
            record.created_at,
        )))
    }

    #[tracing::instrument(name = "Destroy login session", skip(self, session))]
    async fn destroy(&self, session: AuthSession) -> anyhow::Result<()> {
        if let Some(token) = session.token() {
            self.inner.sessions.write().await.remove(&token);
        }
        Ok(())
    }
}
