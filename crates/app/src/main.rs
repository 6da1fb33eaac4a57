use std::sync::Arc;

use chrono::TimeDelta;
use migration::{Migrator, MigratorTrait};
use server::{AuthConfig, InMemoryLoginAttempts, ServerState};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tracklet={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await?;

    let auth = &settings.auth;
    let auth_config = AuthConfig {
        access_secret: auth.access_secret.clone(),
        refresh_secret: auth.refresh_secret.clone(),
        access_ttl: TimeDelta::days(auth.access_ttl_days),
        refresh_ttl: TimeDelta::days(auth.refresh_ttl_days),
        secure_cookies: auth.secure_cookies,
    };
    let login_attempts = InMemoryLoginAttempts::new(
        auth.max_login_attempts,
        TimeDelta::minutes(auth.lockout_minutes),
    );
    let state = ServerState::new(engine, db, auth_config)
        .with_login_attempts(Arc::new(login_attempts));

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
