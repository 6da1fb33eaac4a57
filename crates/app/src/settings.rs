//! Handles settings for the application. Configuration is read from
//! `settings.toml` in the working directory and overridden by `TRACKLET__*`
//! environment variables (e.g. `TRACKLET__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file; created when missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_days: i64,
    pub refresh_ttl_days: i64,
    pub secure_cookies: bool,
    pub max_login_attempts: u32,
    pub lockout_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("auth.access_ttl_days", 7)?
            .set_default("auth.refresh_ttl_days", 30)?
            .set_default("auth.secure_cookies", false)?
            .set_default("auth.max_login_attempts", 5)?
            .set_default("auth.lockout_minutes", 15)?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("TRACKLET").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
