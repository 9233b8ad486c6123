//! Loading billing-provider extracts into the store
//!
//! An extract is a JSON array of subscription or invoice rows. Imports are
//! all-or-nothing: every record is validated before the stored snapshot is
//! replaced, and the replacement itself runs in one transaction.

pub mod invoices;

pub use invoices::{InvoiceRecord, import_invoice_records, import_invoices_file};

use crate::database::{DatabaseError, DatabaseManager};
use crate::mrr::{SubscriptionRecord, ValidationError, subscription::validate_snapshot};
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read extract {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed extract: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid extract record: {0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid invoice {invoice_id}: {reason}")]
    InvalidInvoice { invoice_id: String, reason: String },
    #[error("Failed to store extract: {0}")]
    Database(#[from] DatabaseError),
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub rows_loaded: u64,
    pub extracted_at: DateTime<Utc>,
}

/// Parse an extract body into raw records
pub fn parse_extract(body: &str) -> Result<Vec<SubscriptionRecord>, IngestError> {
    Ok(serde_json::from_str(body)?)
}

/// Validate `records` and replace the stored snapshot with them
pub async fn import_records(
    database: &dyn DatabaseManager,
    records: &[SubscriptionRecord],
    extracted_at: DateTime<Utc>,
) -> Result<ImportSummary, IngestError> {
    let subscriptions = validate_snapshot(records)?;
    debug!("Validated {} subscription records", subscriptions.len());

    let rows_loaded = database
        .subscriptions()
        .replace_all(records, extracted_at)
        .await?;

    info!(
        rows = rows_loaded,
        extracted_at = %extracted_at,
        "Replaced subscription snapshot"
    );

    Ok(ImportSummary {
        rows_loaded,
        extracted_at,
    })
}

/// Read, validate and load an extract file
pub async fn import_file(
    database: &dyn DatabaseManager,
    path: impl AsRef<Path>,
) -> Result<ImportSummary, IngestError> {
    let path = path.as_ref();
    let records = parse_extract(&read_extract(path).await?)?;
    info!("Loaded {} records from {}", records.len(), path.display());

    import_records(database, &records, Utc::now()).await
}

async fn read_extract(path: &Path) -> Result<String, IngestError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })
}
