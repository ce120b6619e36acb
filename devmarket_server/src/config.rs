use std::env;

use dm_common::{
    helpers::{parse_boolean_flag, parse_env_var},
    Secret,
};
use log::*;
use rand::{thread_rng, RngCore};

use crate::errors::ServerError;

const DEFAULT_DM_HOST: &str = "127.0.0.1";
const DEFAULT_DM_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/devmarket.db";
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// If true, the embedded database migrations are run before the server starts accepting requests.
    pub run_migrations: bool,
    pub auth: AuthConfig,
    /// The capacity of each event hook's channel. Producers wait when a handler falls this far behind.
    pub event_buffer_size: usize,
    /// If true, order participants with a live connection are told about every status change of their orders.
    pub order_notifications: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DM_HOST.to_string(),
            port: DEFAULT_DM_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            run_migrations: true,
            auth: AuthConfig::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            order_notifications: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DM_HOST").ok().unwrap_or_else(|| DEFAULT_DM_HOST.into());
        let port = env_or_default("DM_PORT", DEFAULT_DM_PORT);
        let database_url = env::var("DM_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ DM_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_db_connections = nonzero_env_or_default("DM_MAX_DB_CONNECTIONS", DEFAULT_MAX_DB_CONNECTIONS);
        let run_migrations = parse_boolean_flag(env::var("DM_RUN_MIGRATIONS").ok(), true);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let event_buffer_size = nonzero_env_or_default("DM_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE);
        let order_notifications = parse_boolean_flag(env::var("DM_ORDER_NOTIFICATIONS").ok(), true);
        if !order_notifications {
            info!("🪛️ Live order status notifications are disabled.");
        }
        Self {
            host,
            port,
            database_url,
            max_db_connections,
            run_migrations,
            auth,
            event_buffer_size,
            order_notifications,
        }
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match parse_env_var::<T>(name) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            error!("🪛️ {e} Using the default, {default}, instead.");
            default
        },
    }
}

/// Like [`env_or_default`], but zero is also rejected.
fn nonzero_env_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Default + PartialEq + Copy,
    T::Err: std::fmt::Display,
{
    let value = env_or_default(name, default);
    if value == T::default() {
        error!("🪛️ {name} must be greater than zero. Using the default, {default}, instead.");
        return default;
    }
    value
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret shared with the identity provider. Access tokens signed with any other key are rejected.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No token issued by \
             your identity provider will be accepted. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let mut bytes = [0u8; 32];
        thread_rng().fill_bytes(&mut bytes);
        let secret = base64::encode_config(bytes, base64::URL_SAFE_NO_PAD);
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("DM_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [DM_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("DM_JWT_SECRET is empty".to_string()));
        }
        Ok(Self::new(secret))
    }
}
