use crate::ingest::InvoiceRecord;
use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub invoice_id: String,
    pub customer_id: String,
    pub subscription_id: Option<String>,
    pub status: Option<String>,
    pub amount_due: Option<i64>,
    pub amount_paid: Option<i64>,
    pub currency: Option<String>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub hosted_invoice_url: Option<String>,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for InvoiceRecord {
    fn from(model: Model) -> Self {
        Self {
            invoice_id: model.invoice_id,
            customer_id: model.customer_id,
            subscription_id: model.subscription_id,
            status: model.status,
            amount_due: model.amount_due,
            amount_paid: model.amount_paid,
            currency: model.currency,
            period_start: model.period_start,
            period_end: model.period_end,
            created_at: model.created_at,
            paid_at: model.paid_at,
            hosted_invoice_url: model.hosted_invoice_url,
            extracted_at: Some(model.extracted_at),
        }
    }
}

impl ActiveModel {
    pub fn from_record(record: &InvoiceRecord, extracted_at: DateTime<Utc>) -> Self {
        Self {
            invoice_id: Set(record.invoice_id.clone()),
            customer_id: Set(record.customer_id.clone()),
            subscription_id: Set(record.subscription_id.clone()),
            status: Set(record.status.clone()),
            amount_due: Set(record.amount_due),
            amount_paid: Set(record.amount_paid),
            currency: Set(record.currency.clone()),
            period_start: Set(record.period_start),
            period_end: Set(record.period_end),
            created_at: Set(record.created_at),
            paid_at: Set(record.paid_at),
            hosted_invoice_url: Set(record.hosted_invoice_url.clone()),
            extracted_at: Set(record.extracted_at.unwrap_or(extracted_at)),
        }
    }
}
