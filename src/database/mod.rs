//! Billing snapshot storage
//!
//! The store only ever holds one full snapshot per table, replaced wholesale
//! by the import command. Subscriptions are read back in full for every MRR
//! computation; invoices are kept alongside them for reconciliation.

use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, DatabaseConnection};
use sea_orm_migration::{MigrationName, MigratorTrait};
use std::sync::Arc;
use thiserror::Error;

pub mod config;
pub mod dao;
pub mod entities;
pub mod migration;
pub mod store;

pub use config::DatabaseConfig;
pub use dao::{InvoicesDao, SubscriptionsDao};
pub use store::DatabaseSubscriptionStore;

/// Database error types
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Migration error: {0}")]
    Migration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Applied or pending state of a single migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

/// Database manager trait for dependency injection and testing
#[async_trait]
pub trait DatabaseManager: Send + Sync {
    /// Apply all pending migrations
    async fn migrate(&self) -> DatabaseResult<()>;

    /// Roll back the last `steps` migrations, or all of them
    async fn rollback(&self, steps: Option<u32>) -> DatabaseResult<()>;

    /// Every known migration in order, with whether it has been applied
    async fn migration_status(&self) -> DatabaseResult<Vec<MigrationState>>;

    /// Health check for database connection
    async fn health_check(&self) -> DatabaseResult<()>;

    /// Get subscriptions DAO
    fn subscriptions(&self) -> SubscriptionsDao;

    /// Get invoices DAO
    fn invoices(&self) -> InvoicesDao;

    /// Get direct database connection (for migrations and admin operations)
    fn connection(&self) -> &DatabaseConnection;
}

/// Database connection manager implementation
pub struct DatabaseManagerImpl {
    pub connection: DatabaseConnection,
}

impl DatabaseManagerImpl {
    /// Connect using the database section of the configuration
    pub async fn new_from_config(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let mut options = ConnectOptions::new(config.url.clone());
        options.sqlx_logging(false);
        if !config.is_in_memory() {
            options.max_connections(config.max_connections);
        }

        let connection = sea_orm::Database::connect(options)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl DatabaseManager for DatabaseManagerImpl {
    async fn migrate(&self) -> DatabaseResult<()> {
        use crate::database::migration::Migrator;

        tracing::info!("Running database migrations");

        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::Migration(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Successfully completed all migrations");
        Ok(())
    }

    async fn rollback(&self, steps: Option<u32>) -> DatabaseResult<()> {
        use crate::database::migration::Migrator;

        tracing::info!("Rolling back migrations (steps: {:?})", steps);

        Migrator::down(&self.connection, steps)
            .await
            .map_err(|e| DatabaseError::Migration(format!("Failed to roll back: {}", e)))
    }

    async fn migration_status(&self) -> DatabaseResult<Vec<MigrationState>> {
        use crate::database::migration::Migrator;

        let applied: Vec<String> = Migrator::get_applied_migrations(&self.connection)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        Ok(Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                MigrationState {
                    applied: applied.contains(&name),
                    name,
                }
            })
            .collect())
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        self.connection
            .ping()
            .await
            .map_err(|e| DatabaseError::Connection(format!("db error: {}", e)))
    }

    fn subscriptions(&self) -> SubscriptionsDao {
        SubscriptionsDao::new(self.connection.clone())
    }

    fn invoices(&self) -> InvoicesDao {
        InvoicesDao::new(self.connection.clone())
    }

    fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

/// Connectivity and schema check for the subscription store
pub struct DatabaseHealthChecker {
    database: Arc<dyn DatabaseManager>,
}

impl DatabaseHealthChecker {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl HealthChecker for DatabaseHealthChecker {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthCheckResult {
        if let Err(err) = self.database.health_check().await {
            return HealthCheckResult::unhealthy_with_details(
                "DB health check failed".to_string(),
                serde_json::json!({ "connection": "failed", "error": err.to_string() }),
            );
        }

        match self.database.subscriptions().count().await {
            Ok(count) => HealthCheckResult::healthy_with_details(serde_json::json!({
                "connection": "ok",
                "subscriptions": count
            })),
            // reachable but not migrated yet
            Err(err) => HealthCheckResult::degraded_with_details(
                "Subscriptions table unavailable".to_string(),
                serde_json::json!({ "connection": "ok", "error": err.to_string() }),
            ),
        }
    }
}
