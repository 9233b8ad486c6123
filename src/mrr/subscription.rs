use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record-level validation failures.
///
/// A single invalid record fails the whole computation; a partial MRR figure
/// would silently under-report revenue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("subscription {subscription_id}: missing required field `{field}`")]
    MissingField {
        subscription_id: String,
        field: &'static str,
    },
    #[error("subscription {subscription_id}: negative plan_amount {amount}")]
    NegativeAmount { subscription_id: String, amount: i64 },
    #[error("subscription {subscription_id}: quantity must be positive, got {quantity}")]
    InvalidQuantity {
        subscription_id: String,
        quantity: i64,
    },
    #[error("subscription {subscription_id}: plan_interval_count must be positive, got {count}")]
    InvalidIntervalCount { subscription_id: String, count: i64 },
    #[error("subscription {subscription_id}: monthly amount exceeds the representable range")]
    AmountOutOfRange { subscription_id: String },
}

/// Billing-provider subscription status
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    /// Any status outside the four tracked ones (`incomplete`, `unpaid`, ...)
    Other(String),
}

impl SubscriptionStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "trialing" => SubscriptionStatus::Trialing,
            "active" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            other => SubscriptionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Other(other) => other,
        }
    }

    /// Statuses carried into normalization
    pub fn is_tracked(&self) -> bool {
        !matches!(self, SubscriptionStatus::Other(_))
    }

    /// Statuses that contribute revenue to a month
    pub fn is_revenue_bearing(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::PastDue | SubscriptionStatus::Canceled
        )
    }
}

/// Billing interval of a plan price
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlanInterval {
    Day,
    Week,
    Month,
    Year,
    /// Unrecognised interval; normalized with the unmodified per-interval amount
    Other(String),
}

impl PlanInterval {
    pub fn parse(value: &str) -> Self {
        match value {
            "day" => PlanInterval::Day,
            "week" => PlanInterval::Week,
            "month" => PlanInterval::Month,
            "year" => PlanInterval::Year,
            other => PlanInterval::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlanInterval::Day => "day",
            PlanInterval::Week => "week",
            PlanInterval::Month => "month",
            PlanInterval::Year => "year",
            PlanInterval::Other(other) => other,
        }
    }
}

/// A validated subscription snapshot as the engine consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub subscription_id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<DateTime<Utc>>,
    /// Minor currency units per billing interval
    pub plan_amount: i64,
    pub plan_interval: PlanInterval,
    pub plan_interval_count: i64,
    pub quantity: i64,
}

impl Subscription {
    /// Monthly rate in minor units, `None` when it does not fit in an `i64`
    pub fn monthly_amount_cents(&self) -> Option<i64> {
        super::normalize::monthly_amount_cents(
            self.plan_amount,
            self.quantity,
            &self.plan_interval,
            self.plan_interval_count,
        )
    }

    /// Check the numeric invariants of an already-typed subscription
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subscription_id.is_empty() {
            return Err(ValidationError::MissingField {
                subscription_id: "<unknown>".to_string(),
                field: "subscription_id",
            });
        }
        if self.customer_id.is_empty() {
            return Err(ValidationError::MissingField {
                subscription_id: self.subscription_id.clone(),
                field: "customer_id",
            });
        }
        if self.plan_amount < 0 {
            return Err(ValidationError::NegativeAmount {
                subscription_id: self.subscription_id.clone(),
                amount: self.plan_amount,
            });
        }
        if self.quantity < 1 {
            return Err(ValidationError::InvalidQuantity {
                subscription_id: self.subscription_id.clone(),
                quantity: self.quantity,
            });
        }
        if self.plan_interval_count < 1 {
            return Err(ValidationError::InvalidIntervalCount {
                subscription_id: self.subscription_id.clone(),
                count: self.plan_interval_count,
            });
        }
        if self.monthly_amount_cents().is_none() {
            return Err(ValidationError::AmountOutOfRange {
                subscription_id: self.subscription_id.clone(),
            });
        }
        Ok(())
    }
}

/// Raw subscription row as extracted from the billing provider and persisted
/// in the store. Most columns are nullable at this level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub subscription_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub plan_amount: Option<i64>,
    #[serde(default)]
    pub plan_interval: Option<String>,
    #[serde(default)]
    pub plan_interval_count: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: Option<bool>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl TryFrom<&SubscriptionRecord> for Subscription {
    type Error = ValidationError;

    fn try_from(record: &SubscriptionRecord) -> Result<Self, Self::Error> {
        let missing = |field: &'static str| ValidationError::MissingField {
            subscription_id: if record.subscription_id.is_empty() {
                "<unknown>".to_string()
            } else {
                record.subscription_id.clone()
            },
            field,
        };

        let subscription = Subscription {
            subscription_id: record.subscription_id.clone(),
            customer_id: record.customer_id.clone(),
            status: SubscriptionStatus::parse(
                record.status.as_deref().ok_or_else(|| missing("status"))?,
            ),
            created_at: record.created_at.ok_or_else(|| missing("created_at"))?,
            canceled_at: record.canceled_at,
            ended_at: record.ended_at,
            cancel_at_period_end: record.cancel_at_period_end.unwrap_or(false),
            current_period_end: record.current_period_end,
            plan_amount: record.plan_amount.ok_or_else(|| missing("plan_amount"))?,
            plan_interval: PlanInterval::parse(
                record
                    .plan_interval
                    .as_deref()
                    .ok_or_else(|| missing("plan_interval"))?,
            ),
            plan_interval_count: record.plan_interval_count.unwrap_or(1),
            quantity: record.quantity.unwrap_or(1),
        };

        subscription.validate()?;
        Ok(subscription)
    }
}

/// Convert a full snapshot, failing on the first invalid record
pub fn validate_snapshot(
    records: &[SubscriptionRecord],
) -> Result<Vec<Subscription>, ValidationError> {
    records.iter().map(Subscription::try_from).collect()
}
