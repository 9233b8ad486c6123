//! Demo MRR series served when the subscription store cannot be reached.
//!
//! The series is produced by running the engine over a fixed synthetic
//! snapshot, so it always has the exact shape of a live response.

use super::engine::{MrrRow, compute_mrr};
use super::subscription::{PlanInterval, Subscription, SubscriptionStatus};
use chrono::{NaiveDate, TimeZone, Utc};

/// (plan amount in cents, interval)
const STARTER: (i64, PlanInterval) = (2900, PlanInterval::Month);
const PRO: (i64, PlanInterval) = (7900, PlanInterval::Month);
const BUSINESS: (i64, PlanInterval) = (19900, PlanInterval::Month);
const ENTERPRISE: (i64, PlanInterval) = (49900, PlanInterval::Month);
const PRO_ANNUAL: (i64, PlanInterval) = (79000, PlanInterval::Year);
const BUSINESS_ANNUAL: (i64, PlanInterval) = (199000, PlanInterval::Year);

struct DemoSubscription {
    plan: (i64, PlanInterval),
    created: (u32, u32),
    canceled: Option<(u32, u32)>,
    status: SubscriptionStatus,
}

impl DemoSubscription {
    fn new(
        plan: (i64, PlanInterval),
        created: (u32, u32),
        canceled: Option<(u32, u32)>,
        status: SubscriptionStatus,
    ) -> Self {
        Self {
            plan,
            created,
            canceled,
            status,
        }
    }
}

fn demo_snapshot() -> Vec<Subscription> {
    use SubscriptionStatus::*;

    let entries = [
        DemoSubscription::new(STARTER, (1, 3), None, Active),
        DemoSubscription::new(STARTER, (1, 9), Some((3, 14)), Canceled),
        DemoSubscription::new(PRO, (1, 12), None, Active),
        DemoSubscription::new(BUSINESS, (1, 20), None, PastDue),
        DemoSubscription::new(PRO_ANNUAL, (1, 27), None, Active),
        DemoSubscription::new(STARTER, (2, 4), None, Active),
        DemoSubscription::new(ENTERPRISE, (2, 17), None, Active),
        DemoSubscription::new(PRO, (3, 2), Some((5, 8)), Canceled),
        DemoSubscription::new(BUSINESS_ANNUAL, (3, 21), None, Active),
        DemoSubscription::new(STARTER, (4, 6), None, Active),
        DemoSubscription::new(PRO, (4, 11), None, Trialing),
        DemoSubscription::new(BUSINESS, (5, 15), None, Active),
        DemoSubscription::new(STARTER, (6, 2), None, Active),
    ];

    let at = |(month, day): (u32, u32)| Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).single();

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            Some(Subscription {
                subscription_id: format!("sub_demo_{:02}", i + 1),
                customer_id: format!("cus_demo_{:02}", i + 1),
                status: entry.status,
                created_at: at(entry.created)?,
                canceled_at: entry.canceled.and_then(at),
                ended_at: None,
                cancel_at_period_end: false,
                current_period_end: None,
                plan_amount: entry.plan.0,
                plan_interval: entry.plan.1,
                plan_interval_count: 1,
                quantity: 1,
            })
        })
        .collect()
}

/// Six months (2025-01 through 2025-06) of demo MRR rows
pub fn demo_series() -> Vec<MrrRow> {
    let Some(as_of) = NaiveDate::from_ymd_opt(2025, 6, 30) else {
        return Vec::new();
    };
    compute_mrr(&demo_snapshot(), as_of).unwrap_or_default()
}
