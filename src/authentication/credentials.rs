use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, SecretBox};

use crate::domain::{AuthSession, FieldErrors, UserId};
use crate::telemetry::spawn_blocking_with_tracing;

/// Fallback hash in case an invalid username is provided during authentication
const FALLBACK_HASH: &str =
    "$argon2id$v=19$m=15000,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Message shown next to a field that was left empty
pub const BLANK_MESSAGE: &str = "can't be blank";

/// Message shown when the username/password pair does not match a stored user
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password.";

/// Authentication credentials data
pub struct Credentials {
    pub username: String,
    pub password: SecretBox<String>,
}

/// Authentication error type
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

/// Take the submitted password out of `session`, recording an error for every blank field
pub fn take_present_password(session: &mut AuthSession) -> Result<SecretBox<String>, AuthError> {
    let password = session
        .take_password()
        .filter(|p| !p.expose_secret().is_empty());

    if session.username().trim().is_empty() {
        session.add_error("username", BLANK_MESSAGE);
    }
    if password.is_none() {
        session.add_error("password", BLANK_MESSAGE);
    }

    match password {
        Some(password) if session.errors().is_empty() => Ok(password),
        _ => Err(AuthError::InvalidCredentials(anyhow::anyhow!(
            "Missing credentials"
        ))),
    }
}

/// Verify `password` against the stored credentials of the user named in `session`
///
/// The hash comparison always runs, against a fallback hash when the username is unknown, so
/// that response times do not reveal which usernames exist.
#[tracing::instrument(name = "Verify credentials", skip_all)]
pub async fn verify_credentials(
    session: &mut AuthSession,
    stored: Option<(UserId, SecretBox<String>)>,
    password: SecretBox<String>,
) -> Result<UserId, AuthError> {
    // Fallback `user_id` and password hash to prevent timing attacks
    let (user_id, expected_password_hash) = match stored {
        Some((user_id, password_hash)) => (Some(user_id), password_hash),
        None => (None, SecretBox::new(Box::new(FALLBACK_HASH.to_string()))),
    };

    // Verify provided password against stored password hash
    let verified = spawn_blocking_with_tracing(move || {
        verify_password_hash(&expected_password_hash, &password)
    })
    .await
    .context("Failed to spawn blocking task")?;

    let outcome = verified.and_then(|()| {
        user_id.ok_or_else(|| AuthError::InvalidCredentials(anyhow::anyhow!("Unknown username")))
    });
    if matches!(outcome, Err(AuthError::InvalidCredentials(_))) {
        session.add_error(FieldErrors::BASE, INVALID_LOGIN_MESSAGE);
    }
    outcome
}

/// Compare computed and stored password hashes
#[tracing::instrument(name = "Verify password hash", skip(password_hash, password))]
fn verify_password_hash(
    password_hash: &SecretBox<String>,
    password: &SecretBox<String>,
) -> Result<(), AuthError> {
    // Parse stored password hash from PHC string format
    let password_hash =
        PasswordHash::new(password_hash.expose_secret()).context("Invalid stored password hash")?;

    // Compare computed and stored password hashes
    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .context("Invalid password")
        .map_err(AuthError::InvalidCredentials)
}

/// Compute a PHC string for the provided password and a random salt
pub fn compute_password_hash(password: &SecretBox<String>) -> anyhow::Result<SecretBox<String>> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let params = Params::new(15000, 2, 1, None).context("Invalid Argon2 parameters")?;
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .context("Failed to hash password")?
        .to_string();

    Ok(SecretBox::new(Box::new(password_hash)))
}
