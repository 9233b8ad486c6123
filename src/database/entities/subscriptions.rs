use crate::mrr::SubscriptionRecord;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subscription_id: String,
    pub customer_id: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub status: Option<String>,
    pub price_id: Option<String>,
    pub product_id: Option<String>,
    pub plan_amount: Option<i64>,
    pub plan_interval: Option<String>,
    pub plan_interval_count: Option<i64>,
    pub currency: Option<String>,
    pub quantity: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub cancel_at_period_end: Option<bool>,
    pub ended_at: Option<DateTime<Utc>>,
    pub trial_start: Option<DateTime<Utc>>,
    pub trial_end: Option<DateTime<Utc>>,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SubscriptionRecord {
    fn from(model: Model) -> Self {
        Self {
            subscription_id: model.subscription_id,
            customer_id: model.customer_id,
            customer_email: model.customer_email,
            customer_name: model.customer_name,
            status: model.status,
            price_id: model.price_id,
            product_id: model.product_id,
            plan_amount: model.plan_amount,
            plan_interval: model.plan_interval,
            plan_interval_count: model.plan_interval_count,
            currency: model.currency,
            quantity: model.quantity,
            created_at: model.created_at,
            current_period_start: model.current_period_start,
            current_period_end: model.current_period_end,
            canceled_at: model.canceled_at,
            cancel_at_period_end: model.cancel_at_period_end,
            ended_at: model.ended_at,
            trial_start: model.trial_start,
            trial_end: model.trial_end,
            extracted_at: Some(model.extracted_at),
        }
    }
}

impl ActiveModel {
    /// Build an insertable row, stamping `extracted_at` when the record has none
    pub fn from_record(record: &SubscriptionRecord, extracted_at: DateTime<Utc>) -> Self {
        Self {
            subscription_id: Set(record.subscription_id.clone()),
            customer_id: Set(record.customer_id.clone()),
            customer_email: Set(record.customer_email.clone()),
            customer_name: Set(record.customer_name.clone()),
            status: Set(record.status.clone()),
            price_id: Set(record.price_id.clone()),
            product_id: Set(record.product_id.clone()),
            plan_amount: Set(record.plan_amount),
            plan_interval: Set(record.plan_interval.clone()),
            plan_interval_count: Set(record.plan_interval_count),
            currency: Set(record.currency.clone()),
            quantity: Set(record.quantity),
            created_at: Set(record.created_at),
            current_period_start: Set(record.current_period_start),
            current_period_end: Set(record.current_period_end),
            canceled_at: Set(record.canceled_at),
            cancel_at_period_end: Set(record.cancel_at_period_end),
            ended_at: Set(record.ended_at),
            trial_start: Set(record.trial_start),
            trial_end: Set(record.trial_end),
            extracted_at: Set(record.extracted_at.unwrap_or(extracted_at)),
        }
    }
}
