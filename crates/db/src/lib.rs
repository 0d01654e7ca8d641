//! Storage for ecocomb: sea-orm entities, migrations and repositories.
//!
//! Production runs on `PostgreSQL` through [`init`]. Workflow tests use the
//! migrated in-memory SQLite pool from `test_utils::memory_database`
//! (feature `sqlite`), which holds a single connection so every statement of
//! a transaction goes through it.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use ecocomb_common::{AppError, Config, config::DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{info, log::LevelFilter};

/// Pool options for the configured database. SQL is logged at debug level.
#[must_use]
pub fn connect_options(database: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&database.url);

    opt.max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    opt
}

/// Connect the pool.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let db = Database::connect(connect_options(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    info!(
        max_connections = config.database.max_connections,
        "Database connected"
    );

    Ok(db)
}

/// Apply pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    let pending = migrations::Migrator::get_pending_migrations(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if pending.is_empty() {
        return Ok(());
    }

    info!(pending = pending.len(), "Applying migrations");
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
