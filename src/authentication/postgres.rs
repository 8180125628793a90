use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretBox};
use sqlx::PgPool;
use uuid::Uuid;

use crate::authentication::credentials::{take_present_password, verify_credentials};
use crate::authentication::{
    compute_password_hash, default_session_ttl, AuthError, CredentialStore,
};
use crate::domain::{AuthSession, SessionToken, UserId};
use crate::telemetry::spawn_blocking_with_tracing;

/// Credential store backed by the `users` and `login_sessions` tables
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    db_pool: PgPool,
    session_ttl: Duration,
}

impl PgCredentialStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self {
            db_pool,
            session_ttl: default_session_ttl(),
        }
    }

    /// Set how long login sessions stay valid
    #[must_use]
    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Delete expired login sessions, returning how many were deleted
    #[tracing::instrument(name = "Purge expired login sessions", skip(self))]
    pub async fn purge_expired(&self) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM login_sessions
            WHERE created_at <= $1
            ",
        )
        .bind(Utc::now() - self.session_ttl)
        .execute(&self.db_pool)
        .await
        .context("Failed to purge expired login sessions")?;

        Ok(result.rows_affected())
    }
}

impl CredentialStore for PgCredentialStore {
    #[tracing::instrument(
        name = "Create login session",
        skip(self, session),
        fields(username = %session.username(), user_id = tracing::field::Empty)
    )]
    async fn create(&self, session: &mut AuthSession) -> Result<(), AuthError> {
        let password = take_present_password(session)?;
        let stored = get_stored_creds(session.username(), &self.db_pool).await?;
        let user_id = verify_credentials(session, stored, password).await?;
        tracing::Span::current().record("user_id", tracing::field::display(&user_id));

        self.purge_expired().await?;
        let token = SessionToken::generate();
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r"
            INSERT INTO login_sessions (session_token, user_id)
            VALUES ($1, $2)
            RETURNING created_at
            ",
        )
        .bind(*token)
        .bind(*user_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to store login session")?;

        session.authenticate(token, user_id, created_at);
        Ok(())
    }

    #[tracing::instrument(name = "Find login session", skip(self))]
    async fn find_current(&self, token: SessionToken) -> anyhow::Result<Option<AuthSession>> {
        let row: Option<(Uuid, String, DateTime<Utc>)> = sqlx::query_as(
            r"
            SELECT s.user_id, u.username, s.created_at
            FROM login_sessions s
            JOIN users u ON u.user_id = s.user_id
            WHERE s.session_token = $1 AND s.created_at > $2
            ",
        )
        .bind(*token)
        .bind(Utc::now() - self.session_ttl)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to perform a query to find the login session")?;

        Ok(row.map(|(user_id, username, created_at)| {
            AuthSession::restore(token, UserId::new(user_id), username, created_at)
        }))
    }

    #[tracing::instrument(
        name = "Destroy login session",
        skip(self, session),
        fields(token = tracing::field::Empty)
    )]
    async fn destroy(&self, session: AuthSession) -> anyhow::Result<()> {
        let Some(token) = session.token() else {
            return Ok(());
        };
        tracing::Span::current().record("token", tracing::field::display(&token));

        sqlx::query(
            r"
            DELETE FROM login_sessions
            WHERE session_token = $1
            ",
        )
        .bind(*token)
        .execute(&self.db_pool)
        .await
        .context("Failed to delete login session")?;

        Ok(())
    }
}

/// Extract stored authentication credentials from the database
#[tracing::instrument(name = "Get stored credentials", skip(username, db_pool))]
async fn get_stored_creds(
    username: &str,
    db_pool: &PgPool,
) -> anyhow::Result<Option<(UserId, SecretBox<String>)>> {
    let row: Option<(Uuid, String)> = sqlx::query_as(
        r"
        SELECT user_id, password_hash
        FROM users
        WHERE username = $1
        ",
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await
    .context("Failed to perform a query to validate auth credentials")?;

    Ok(row.map(|(user_id, password_hash)| {
        (UserId::new(user_id), SecretBox::new(Box::new(password_hash)))
    }))
}

/// Store a new user with the provided password
#[tracing::instrument(name = "Store user", skip(password, db_pool))]
pub async fn store_user(
    username: &str,
    password: SecretBox<String>,
    db_pool: &PgPool,
) -> anyhow::Result<UserId> {
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(&password))
        .await
        .context("Failed to spawn blocking task")??;

    let user_id = UserId::new(Uuid::new_v4());
    sqlx::query(
        r"
        INSERT INTO users (user_id, username, password_hash)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(*user_id)
    .bind(username)
    .bind(password_hash.expose_secret().as_str())
    .execute(db_pool)
    .await
    .context("Failed to store user")?;

    Ok(user_id)
}
