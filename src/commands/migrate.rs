use crate::database::DatabaseManager;
use clap::Subcommand;
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Run all pending migrations
    Up,
    /// Rollback the last migration
    Down {
        #[arg(
            short,
            long,
            help = "Number of migrations to rollback",
            default_value = "1"
        )]
        steps: u32,
    },
    /// Show migration status
    Status,
}

pub async fn handle_migrate_command(
    action: MigrateAction,
    database: Arc<dyn DatabaseManager>,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MigrateAction::Up => {
            database.migrate().await?;
            info!("All migrations completed successfully");
        }
        MigrateAction::Down { steps } => {
            info!("Rolling back {} migration(s)...", steps);
            database.rollback(Some(steps)).await?;
            info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            for migration in database.migration_status().await? {
                let state = if migration.applied { "applied" } else { "pending" };
                println!("{:<8} {}", state, migration.name);
            }
        }
    }

    Ok(())
}
