use std::{io, net, time};

use actix_session::storage::{RedisSessionStore, SessionStore};
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::authentication::{require_login, CredentialStore, PgCredentialStore};
use crate::configuration::{ApplicationSettings, Settings};
use crate::lifecycle::SessionLifecycle;
use crate::routes::{create_session, destroy_session, health_check, home, login_form, root};

/// Application
pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    /// Build an application based on settings, backed by Postgres and Redis
    pub async fn build(config: Settings) -> anyhow::Result<Self> {
        // Connect to the database
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(time::Duration::from_secs(2))
            .connect_lazy_with(config.database.db_options());

        // Set up Redis session store
        let redis_store = RedisSessionStore::new(config.redis_uri.expose_secret())
            .await
            .context("Failed to connect to the Redis session store")?;

        Self::build_with_stores(
            &config.application,
            PgCredentialStore::new(db_pool).with_session_ttl(config.application.session_ttl()),
            move || redis_store.clone(),
        )
    }

    /// Build an application based on settings and the provided stores
    ///
    /// `session_store` is called once per worker to build the cookie session backend.
    pub fn build_with_stores<C, St, F>(
        config: &ApplicationSettings,
        credential_store: C,
        session_store: F,
    ) -> anyhow::Result<Self>
    where
        C: CredentialStore,
        St: SessionStore + 'static,
        F: Fn() -> St + Clone + Send + 'static,
    {
        let listener = net::TcpListener::bind(format!("{}:{}", config.app_host, config.app_port))?;
        let port = listener.local_addr()?.port();
        let server = run_server(
            listener,
            SessionLifecycle::new(credential_store, config.locations()),
            &config.hmac_secret,
            config.secure_cookies,
            session_store,
        )?;
        Ok(Self { server, port })
    }

    /// Get application port
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Run application until it is stopped
    pub async fn run_until_stopped(self) -> io::Result<()> {
        self.server.await
    }
}

/// Run the HTTP server
pub fn run_server<C, St, F>(
    listener: net::TcpListener,
    lifecycle: SessionLifecycle<C>,
    signing_key: &SecretString,
    secure_cookies: bool,
    session_store: F,
) -> anyhow::Result<Server>
where
    C: CredentialStore,
    St: SessionStore + 'static,
    F: Fn() -> St + Clone + Send + 'static,
{
    // Extract secret key from HMAC secret
    let signing_key = Key::try_from(signing_key.expose_secret().as_bytes())
        .map_err(|_| anyhow::anyhow!("The HMAC secret must be at least 64 bytes long"))?;

    // Build message framework
    let message_store = CookieMessageStore::builder(signing_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    // Prepare data to be added the application context
    let locations = web::Data::new(lifecycle.locations().clone());
    let lifecycle = web::Data::new(lifecycle);

    // Start the HTTP server
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(session_store(), signing_key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            .wrap(TracingLogger::default())
            .route(&locations.root, web::get().to(root))
            .route("/health_check", web::get().to(health_check))
            .route(&locations.login, web::get().to(login_form::<C>))
            .route("/login", web::get().to(login_form::<C>))
            .route("/sessions", web::post().to(create_session::<C>))
            .service(
                web::resource(locations.home.as_str())
                    .wrap(from_fn(require_login))
                    .route(web::get().to(home::<C>)),
            )
            .service(
                web::resource("/sessions/current")
                    .wrap(from_fn(require_login))
                    .route(web::delete().to(destroy_session::<C>)),
            )
            // HTML forms cannot send DELETE
            .service(
                web::resource("/logout")
                    .wrap(from_fn(require_login))
                    .route(web::post().to(destroy_session::<C>)),
            )
            .app_data(lifecycle.clone())
            .app_data(locations.clone())
    })
    .listen(listener)?
    .run())
}
