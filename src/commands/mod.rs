pub mod import;
pub mod migrate;
pub mod report;

use crate::Config;
use crate::database::{DatabaseManager, DatabaseManagerImpl};
use clap::Subcommand;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: migrate::MigrateAction,
    },
    /// Replace the stored subscriptions with a billing-provider extract
    Import(import::ImportArgs),
    /// Compute the MRR series from the store and print it
    Report(report::ReportArgs),
}

pub async fn handle_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let database: Arc<dyn DatabaseManager> =
        Arc::new(DatabaseManagerImpl::new_from_config(&config.database).await?);

    match command {
        Commands::Migrate { action } => migrate::handle_migrate_command(action, database).await,
        Commands::Import(args) => import::handle_import_command(args, config, database).await,
        Commands::Report(args) => report::handle_report_command(args, config, database).await,
    }
}
