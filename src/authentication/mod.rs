mod credentials;
mod memory;
mod middleware;
mod postgres;
mod store;

pub use credentials::{
    compute_password_hash, AuthError, Credentials, BLANK_MESSAGE, INVALID_LOGIN_MESSAGE,
};
pub use memory::InMemoryCredentialStore;
pub use middleware::require_login;
pub use postgres::{store_user, PgCredentialStore};
pub use store::{default_session_ttl, CredentialStore};
