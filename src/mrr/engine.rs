use super::month::{Month, month_spine};
use super::normalize::normalize;
use super::subscription::{Subscription, ValidationError};
use super::MrrResult;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One month of the MRR series. Field names are the public JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrrRow {
    /// `YYYY-MM`
    pub month: String,
    pub active_subscriptions: u32,
    pub active_customers: u32,
    /// Major currency units, two decimals
    pub mrr_amount: f64,
    pub mrr_cents: i64,
    pub mrr_change: Option<f64>,
    /// Percent change vs. the previous month, one decimal
    pub mrr_change_pct: Option<f64>,
}

#[derive(Debug, Default)]
struct MonthBucket<'a> {
    subscriptions: HashSet<&'a str>,
    customers: HashSet<&'a str>,
    cents: i64,
}

/// Compute the monthly MRR series as of `as_of`.
///
/// The series spans every month from the earliest `created_at` through the
/// month of `as_of`, with no gaps. An empty snapshot, or an `as_of` earlier
/// than every subscription, yields an empty series. Any invalid subscription
/// fails the whole computation.
pub fn compute_mrr(subscriptions: &[Subscription], as_of: NaiveDate) -> MrrResult<Vec<MrrRow>> {
    for subscription in subscriptions {
        subscription.validate()?;
    }

    let Some(earliest) = subscriptions.iter().map(|s| s.created_at).min() else {
        debug!("Empty subscription snapshot, producing empty series");
        return Ok(Vec::new());
    };

    let first = Month::containing(earliest.date_naive());
    let last = Month::containing(as_of);
    let spine = month_spine(first, last);
    if spine.is_empty() {
        debug!("Reference month {} precedes first subscription month {}", last, first);
        return Ok(Vec::new());
    }

    let mut buckets: Vec<MonthBucket<'_>> =
        spine.iter().map(|_| MonthBucket::default()).collect();

    // Walk each covered range directly rather than crossing months with subscriptions
    for subscription in subscriptions {
        let Some(normalized) = normalize(subscription)? else {
            continue;
        };
        let Some((from, to)) = normalized.covered_months(first, last) else {
            continue;
        };

        let start_index = from.months_since(first) as usize;
        let end_index = to.months_since(first) as usize;

        for bucket in &mut buckets[start_index..=end_index] {
            bucket.subscriptions.insert(normalized.subscription_id);
            bucket.customers.insert(normalized.customer_id);
            bucket.cents = bucket
                .cents
                .checked_add(normalized.monthly_amount_cents)
                .ok_or_else(|| ValidationError::AmountOutOfRange {
                    subscription_id: normalized.subscription_id.to_string(),
                })?;
        }
    }

    let rows = sequence_rows(&spine, &buckets);

    debug!(
        "Computed MRR series: {} subscriptions, {} months ({} to {})",
        subscriptions.len(),
        rows.len(),
        first,
        last
    );

    Ok(rows)
}

fn sequence_rows(spine: &[Month], buckets: &[MonthBucket<'_>]) -> Vec<MrrRow> {
    let mut rows = Vec::with_capacity(spine.len());
    let mut previous_cents: Option<i64> = None;

    for (month, bucket) in spine.iter().zip(buckets) {
        let (mrr_change, mrr_change_pct) = match previous_cents {
            // totals are non-negative, so the difference cannot overflow
            Some(previous) => (
                Some(to_float(cents_to_amount(bucket.cents - previous))),
                change_pct(previous, bucket.cents).map(to_float),
            ),
            None => (None, None),
        };

        rows.push(MrrRow {
            month: month.label(),
            active_subscriptions: bucket.subscriptions.len() as u32,
            active_customers: bucket.customers.len() as u32,
            mrr_amount: to_float(cents_to_amount(bucket.cents)),
            mrr_cents: bucket.cents,
            mrr_change,
            mrr_change_pct,
        });

        previous_cents = Some(bucket.cents);
    }

    rows
}

/// Exact two-decimal amount in major units
fn cents_to_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Percent change rounded to one decimal, `None` when the previous month is zero
fn change_pct(previous_cents: i64, current_cents: i64) -> Option<Decimal> {
    if previous_cents == 0 {
        return None;
    }

    let delta = Decimal::from(current_cents) - Decimal::from(previous_cents);
    delta
        .checked_div(Decimal::from(previous_cents))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Nearest `f64` to an exact decimal; the divisor is a small power of ten
fn to_float(value: Decimal) -> f64 {
    value.mantissa() as f64 / 10f64.powi(value.scale() as i32)
}
