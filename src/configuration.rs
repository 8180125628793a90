use std::env;

use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::log::LevelFilter;

use crate::lifecycle::Locations;

/// Settings
#[derive(Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub redis_uri: SecretString,
}

/// Get settings from configuration files and environment variables
pub fn get_config() -> Result<Settings, ConfigError> {
    let path = env::current_dir().map_err(|e| {
        ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let config_dir = path.join("config");

    // Detect the running environment (default: `dev`)
    let env: Env = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let env_file = format!("{}.yaml", env.as_str());

    // Read the configuration from files and environment variables
    Config::builder()
        // Base configuration file
        .add_source(File::from(config_dir.join("base.yaml")).required(true))
        // Environment-specific configuration file
        .add_source(File::from(config_dir.join(env_file)).required(true))
        // Environment variables (e.g., `GATEHOUSE__APPLICATION__APP_PORT=8888`
        // would set Settings.application.app_port to 8888)
        .add_source(
            Environment::with_prefix("GATEHOUSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// Application settings
#[derive(Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub app_host: String,
    pub app_port: u16,
    /// Key for signing the session and flash cookies, at least 64 bytes long
    pub hmac_secret: SecretString,
    /// Only send the session cookie over HTTPS
    pub secure_cookies: bool,
    /// Landing page after a login without a recorded `return_to`
    pub home_path: String,
    /// Landing page after a logout
    pub root_path: String,
    /// How long a login session stays valid
    pub session_ttl_hours: i64,
}

impl ApplicationSettings {
    /// Application locations, with the login form at its fixed path
    pub fn locations(&self) -> Locations {
        Locations {
            home: self.home_path.clone(),
            root: self.root_path.clone(),
            ..Locations::default()
        }
    }

    /// Login session lifetime
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }
}

/// Database settings
#[derive(Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    username: String,
    password: SecretString,
    host: String,
    port: u16,
    database: String,
    require_ssl: bool,
}

impl DatabaseSettings {
    /// Generate options and flags that can be used to configure a database connection
    pub fn db_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .username(&self.username)
            .password(self.password.expose_secret())
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .ssl_mode(ssl_mode)
            .log_statements(LevelFilter::Trace)
    }
}

/// Available runtime environments
#[derive(Debug)]
pub enum Env {
    Development,
    Production,
}

impl Env {
    /// Represent environment as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prd",
        }
    }
}

impl TryFrom<String> for Env {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "dev" => Ok(Self::Development),
            "prd" => Ok(Self::Production),
            other => Err(format!(
                "`{other}` is not a supported environment. Use either `dev` or `prd`"
            )),
        }
    }
}
