//! Invoice extracts
//!
//! Invoices are stored next to the subscription snapshot for reconciliation
//! against billed amounts; they do not feed the MRR series.

use super::{ImportSummary, IngestError, read_extract};
use crate::database::DatabaseManager;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Raw invoice row as extracted from the billing provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Minor currency units
    #[serde(default)]
    pub amount_due: Option<i64>,
    #[serde(default)]
    pub amount_paid: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hosted_invoice_url: Option<String>,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl InvoiceRecord {
    pub fn validate(&self) -> Result<(), IngestError> {
        let invalid = |reason: &str| IngestError::InvalidInvoice {
            invoice_id: self.invoice_id.clone(),
            reason: reason.to_string(),
        };

        if self.invoice_id.is_empty() {
            return Err(invalid("missing invoice_id"));
        }
        if self.customer_id.is_empty() {
            return Err(invalid("missing customer_id"));
        }
        if self.amount_due.is_some_and(|amount| amount < 0) {
            return Err(invalid("negative amount_due"));
        }
        if self.amount_paid.is_some_and(|amount| amount < 0) {
            return Err(invalid("negative amount_paid"));
        }
        Ok(())
    }
}

pub fn parse_invoice_extract(body: &str) -> Result<Vec<InvoiceRecord>, IngestError> {
    Ok(serde_json::from_str(body)?)
}

/// Validate `records` and replace the stored invoices with them
pub async fn import_invoice_records(
    database: &dyn DatabaseManager,
    records: &[InvoiceRecord],
    extracted_at: DateTime<Utc>,
) -> Result<ImportSummary, IngestError> {
    for record in records {
        record.validate()?;
    }
    debug!("Validated {} invoice records", records.len());

    let rows_loaded = database
        .invoices()
        .replace_all(records, extracted_at)
        .await?;

    info!(
        rows = rows_loaded,
        extracted_at = %extracted_at,
        "Replaced invoice snapshot"
    );

    Ok(ImportSummary {
        rows_loaded,
        extracted_at,
    })
}

/// Read, validate and load an invoice extract file
pub async fn import_invoices_file(
    database: &dyn DatabaseManager,
    path: impl AsRef<Path>,
) -> Result<ImportSummary, IngestError> {
    let path = path.as_ref();
    let records = parse_invoice_extract(&read_extract(path).await?)?;
    info!("Loaded {} invoices from {}", records.len(), path.display());

    import_invoice_records(database, &records, Utc::now()).await
}
