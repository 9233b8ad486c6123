//! Per-subscription normalization: active window and monthly amount.
//!
//! Monthly amounts are computed with exact integer arithmetic and rounded to
//! the nearest minor unit, ties away from zero, once per subscription.

use super::month::Month;
use super::subscription::{PlanInterval, Subscription, SubscriptionStatus, ValidationError};
use chrono::NaiveDate;

/// A subscription reduced to what month membership and aggregation need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubscription<'a> {
    pub subscription_id: &'a str,
    pub customer_id: &'a str,
    pub status: &'a SubscriptionStatus,
    pub start_date: NaiveDate,
    /// `None` while the subscription is open-ended
    pub end_date: Option<NaiveDate>,
    pub monthly_amount_cents: i64,
}

impl NormalizedSubscription<'_> {
    /// Whether this subscription counts toward `month`.
    ///
    /// Active on any day of `[month.start(), month.end())` counts for the whole
    /// month; trialing subscriptions never count.
    pub fn covers(&self, month: Month) -> bool {
        self.status.is_revenue_bearing()
            && self.start_date < month.end()
            && self.end_date.is_none_or(|end| end >= month.start())
    }

    /// Inclusive range of months this subscription covers within `[first, last]`
    pub fn covered_months(&self, first: Month, last: Month) -> Option<(Month, Month)> {
        if !self.status.is_revenue_bearing() {
            return None;
        }

        let from = Month::containing(self.start_date).max(first);
        let to = match self.end_date {
            Some(end) => Month::containing(end).min(last),
            None => last,
        };

        (from <= to).then_some((from, to))
    }
}

/// Normalize a tracked subscription; untracked statuses yield `Ok(None)`
pub fn normalize(
    subscription: &Subscription,
) -> Result<Option<NormalizedSubscription<'_>>, ValidationError> {
    if !subscription.status.is_tracked() {
        return Ok(None);
    }

    let monthly_amount_cents = subscription.monthly_amount_cents().ok_or_else(|| {
        ValidationError::AmountOutOfRange {
            subscription_id: subscription.subscription_id.clone(),
        }
    })?;

    Ok(Some(NormalizedSubscription {
        subscription_id: &subscription.subscription_id,
        customer_id: &subscription.customer_id,
        status: &subscription.status,
        start_date: subscription.created_at.date_naive(),
        end_date: end_date(subscription),
        monthly_amount_cents,
    }))
}

/// End of the active window, by priority: `ended_at`, then `canceled_at` for
/// canceled subscriptions, then `current_period_end` when set to cancel at
/// period end.
pub fn end_date(subscription: &Subscription) -> Option<NaiveDate> {
    if let Some(ended_at) = subscription.ended_at {
        return Some(ended_at.date_naive());
    }

    if subscription.status == SubscriptionStatus::Canceled {
        if let Some(canceled_at) = subscription.canceled_at {
            return Some(canceled_at.date_naive());
        }
    }

    if subscription.cancel_at_period_end {
        return subscription.current_period_end.map(|end| end.date_naive());
    }

    None
}

/// Convert a per-interval amount into a monthly rate in minor units.
///
/// | interval | monthly rate                          |
/// |----------|---------------------------------------|
/// | year     | amount × qty / (12 × count)           |
/// | month    | amount × qty / count                  |
/// | week     | amount × qty × (52 / 12) / count      |
/// | day      | amount × qty × (365.25 / 12) / count  |
/// | other    | amount × qty                          |
///
/// Returns `None` when an intermediate product or the rounded rate does not
/// fit its integer type.
pub fn monthly_amount_cents(
    plan_amount: i64,
    quantity: i64,
    interval: &PlanInterval,
    interval_count: i64,
) -> Option<i64> {
    let total = i128::from(plan_amount).checked_mul(i128::from(quantity))?;
    let count = i128::from(interval_count.max(1));

    // Each rate expressed as an exact fraction numerator / denominator
    let (numerator, denominator) = match interval {
        PlanInterval::Year => (total, 12 * count),
        PlanInterval::Month => (total, count),
        PlanInterval::Week => (total.checked_mul(52)?, 12 * count),
        PlanInterval::Day => (total.checked_mul(1461)?, 48 * count),
        PlanInterval::Other(_) => (total, 1),
    };

    let rounded = div_round_half_away(numerator, denominator)?;
    i64::try_from(rounded).ok()
}

fn div_round_half_away(numerator: i128, denominator: i128) -> Option<i128> {
    let doubled = numerator.checked_abs()?.checked_mul(2)?;
    let magnitude = doubled.checked_add(denominator)? / (2 * denominator);
    Some(if numerator < 0 { -magnitude } else { magnitude })
}
