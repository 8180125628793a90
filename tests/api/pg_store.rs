use chrono::Duration;
use claim::{assert_none, assert_ok};
use secrecy::SecretBox;
use sqlx::PgPool;

use gatehouse::authentication::{
    store_user, AuthError, CredentialStore, Credentials, PgCredentialStore,
};
use gatehouse::domain::AuthSession;

use crate::helpers::{fake_password, fake_username};

fn attempt(username: &str, password: &str) -> AuthSession {
    AuthSession::from_credentials(Credentials {
        username: username.to_string(),
        password: SecretBox::new(Box::new(password.to_string())),
    })
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres instance at DATABASE_URL"]
async fn postgres_login_sessions_can_be_created_found_and_destroyed(db_pool: PgPool) {
    let username = fake_username();
    let password = fake_password();
    let user_id = store_user(
        &username,
        SecretBox::new(Box::new(password.clone())),
        &db_pool,
    )
    .await
    .unwrap();
    let store = PgCredentialStore::new(db_pool);

    let mut session = attempt(&username, &password);
    assert_ok!(store.create(&mut session).await);
    assert_eq!(session.user_id(), Some(user_id));
    let token = session.token().unwrap();

    let found = store.find_current(token).await.unwrap().unwrap();
    assert_eq!(found.username(), username);

    assert_ok!(store.destroy(found).await);
    assert_none!(store.find_current(token).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres instance at DATABASE_URL"]
async fn postgres_store_rejects_a_wrong_password(db_pool: PgPool) {
    let username = fake_username();
    store_user(
        &username,
        SecretBox::new(Box::new(fake_password())),
        &db_pool,
    )
    .await
    .unwrap();
    let store = PgCredentialStore::new(db_pool);

    let mut session = attempt(&username, "random_password");
    let err = store.create(&mut session).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials(_)));
    assert!(!session.is_authenticated());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres instance at DATABASE_URL"]
async fn postgres_store_forgets_expired_sessions(db_pool: PgPool) {
    let username = fake_username();
    let password = fake_password();
    store_user(
        &username,
        SecretBox::new(Box::new(password.clone())),
        &db_pool,
    )
    .await
    .unwrap();
    let store = PgCredentialStore::new(db_pool).with_session_ttl(Duration::zero());

    let mut session = attempt(&username, &password);
    store.create(&mut session).await.unwrap();
    assert_none!(store.find_current(session.token().unwrap()).await.unwrap());
    assert_eq!(store.purge_expired().await.unwrap(), 1);
}
