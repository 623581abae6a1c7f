pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://./parkit.db?mode=rwc";

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./parkit.db?mode=rwc")
    pub url: String,
    /// Pool size; in-memory SQLite needs exactly one connection
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            ..Self::default()
        }
    }

    /// Private in-memory SQLite database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections.max(1))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sea_orm::DatabaseConnection;
    use sea_orm_migration::MigratorTrait;

    use super::migrator::Migrator;
    use super::{init_database, DatabaseConfig};

    /// Fresh in-memory database with the schema and seed spots applied
    pub async fn migrated_memory_db() -> DatabaseConnection {
        let db = init_database(&DatabaseConfig::in_memory())
            .await
            .expect("in-memory database");
        Migrator::up(&db, None).await.expect("migrations");
        db
    }
}
