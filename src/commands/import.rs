use crate::Config;
use crate::database::DatabaseManager;
use crate::ingest::{import_file, import_invoices_file};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args)]
pub struct ImportArgs {
    /// JSON extract: an array of subscription rows
    #[arg(short, long, required_unless_present = "invoices")]
    pub file: Option<PathBuf>,

    /// JSON extract: an array of invoice rows
    #[arg(long)]
    pub invoices: Option<PathBuf>,
}

pub async fn handle_import_command(
    args: ImportArgs,
    config: &Config,
    database: Arc<dyn DatabaseManager>,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.database.migration_on_startup {
        database.migrate().await?;
    }

    if let Some(file) = &args.file {
        let summary = import_file(database.as_ref(), file).await?;
        info!(
            "Imported {} subscriptions from {} (extracted at {})",
            summary.rows_loaded,
            file.display(),
            summary.extracted_at.to_rfc3339()
        );
        println!("Loaded {} subscription rows", summary.rows_loaded);
    }

    if let Some(file) = &args.invoices {
        let summary = import_invoices_file(database.as_ref(), file).await?;
        info!(
            "Imported {} invoices from {} (extracted at {})",
            summary.rows_loaded,
            file.display(),
            summary.extracted_at.to_rfc3339()
        );
        println!("Loaded {} invoice rows", summary.rows_loaded);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseConfig, DatabaseManagerImpl};
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        import: ImportArgs,
    }

    fn extract_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_requires_at_least_one_extract() {
        assert!(Cli::try_parse_from(["import"]).is_err());

        let cli = Cli::try_parse_from(["import", "--invoices", "invoices.json"]).unwrap();
        assert!(cli.import.file.is_none());
        assert_eq!(cli.import.invoices, Some(PathBuf::from("invoices.json")));
    }

    #[tokio::test]
    async fn test_import_both_extracts() {
        let subscriptions = extract_file(
            r#"[{"subscription_id": "sub_1", "customer_id": "cus_1", "status": "active",
                 "plan_amount": 2900, "plan_interval": "month",
                 "created_at": "2025-01-15T10:00:00Z"}]"#,
        );
        let invoices = extract_file(
            r#"[{"invoice_id": "in_1", "customer_id": "cus_1", "subscription_id": "sub_1",
                 "status": "paid", "amount_due": 2900, "amount_paid": 2900}]"#,
        );

        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.migration_on_startup = true;
        let database = Arc::new(
            DatabaseManagerImpl::new_from_config(&config.database)
                .await
                .unwrap(),
        );

        let args = ImportArgs {
            file: Some(subscriptions.path().to_path_buf()),
            invoices: Some(invoices.path().to_path_buf()),
        };
        handle_import_command(args, &config, database.clone())
            .await
            .unwrap();

        assert_eq!(database.subscriptions().count().await.unwrap(), 1);
        assert_eq!(database.invoices().count().await.unwrap(), 1);
    }
}
