use super::config::MrrConfig;
use super::engine::{MrrRow, compute_mrr};
use super::subscription::{SubscriptionRecord, validate_snapshot};
use super::{MrrError, MrrResult};
use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Source of full subscription snapshots.
///
/// Implementations report connectivity failures as
/// [`MrrError::StoreUnavailable`].
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn fetch_subscriptions(&self) -> MrrResult<Vec<SubscriptionRecord>>;
}

#[derive(Clone, Debug)]
struct CachedSeries {
    rows: Vec<MrrRow>,
    expires_at: DateTime<Utc>,
}

impl CachedSeries {
    fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Fetch-and-compute boundary around the engine.
///
/// Every call reads a fresh full snapshot unless a short-lived cached series
/// for the same reference date is still valid.
pub struct MrrService {
    store: Arc<dyn SubscriptionStore>,
    config: MrrConfig,
    cache: RwLock<HashMap<NaiveDate, CachedSeries>>,
}

impl MrrService {
    pub fn new(store: Arc<dyn SubscriptionStore>, config: MrrConfig) -> Self {
        Self {
            store,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &MrrConfig {
        &self.config
    }

    /// MRR series as of `as_of`
    pub async fn series(&self, as_of: NaiveDate) -> MrrResult<Vec<MrrRow>> {
        if let Some(rows) = self.cached(as_of).await {
            debug!("Serving cached MRR series for {}", as_of);
            return Ok(rows);
        }

        let rows = self.compute(as_of).await?;

        if self.config.cache_ttl_seconds > 0 {
            let ttl = chrono::Duration::seconds(self.config.cache_ttl_seconds as i64);
            let mut cache = self.cache.write().await;
            cache.retain(|_, entry| !entry.is_expired());
            cache.insert(
                as_of,
                CachedSeries {
                    rows: rows.clone(),
                    expires_at: Utc::now() + ttl,
                },
            );
        }

        Ok(rows)
    }

    async fn compute(&self, as_of: NaiveDate) -> MrrResult<Vec<MrrRow>> {
        let records = self.store.fetch_subscriptions().await.inspect_err(|e| {
            error!("Failed to fetch subscription snapshot: {}", e);
        })?;

        if records.is_empty() && self.config.require_data {
            return Err(MrrError::EmptyInput);
        }

        let subscriptions = validate_snapshot(&records).inspect_err(|e| {
            error!("Rejecting subscription snapshot: {}", e);
        })?;

        let rows = compute_mrr(&subscriptions, as_of)?;

        info!(
            "Computed MRR series as of {}: {} subscriptions, {} months",
            as_of,
            subscriptions.len(),
            rows.len()
        );

        Ok(rows)
    }

    async fn cached(&self, as_of: NaiveDate) -> Option<Vec<MrrRow>> {
        if self.config.cache_ttl_seconds == 0 {
            return None;
        }

        let cache = self.cache.read().await;
        cache
            .get(&as_of)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.rows.clone())
    }

    /// Drop every cached series
    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }
}

#[async_trait]
impl HealthChecker for MrrService {
    fn name(&self) -> &str {
        "mrr"
    }

    async fn check(&self) -> HealthCheckResult {
        match self.compute(Utc::now().date_naive()).await {
            Ok(rows) => HealthCheckResult::healthy_with_details(serde_json::json!({
                "months": rows.len(),
                "latest_month": rows.last().map(|r| r.month.clone()),
                "latest_mrr": rows.last().map(|r| r.mrr_amount),
            })),
            Err(MrrError::StoreUnavailable(msg)) => HealthCheckResult::unhealthy_with_details(
                "Subscription store unavailable".to_string(),
                serde_json::json!({ "error": msg, "demo_fallback": self.config.demo_fallback }),
            ),
            Err(err) => HealthCheckResult::degraded(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticStore {
        records: Vec<SubscriptionRecord>,
        fetches: AtomicUsize,
    }

    impl StaticStore {
        fn new(records: Vec<SubscriptionRecord>) -> Self {
            Self {
                records,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SubscriptionStore for StaticStore {
        async fn fetch_subscriptions(&self) -> MrrResult<Vec<SubscriptionRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl SubscriptionStore for UnreachableStore {
        async fn fetch_subscriptions(&self) -> MrrResult<Vec<SubscriptionRecord>> {
            Err(MrrError::StoreUnavailable("connection refused".to_string()))
        }
    }

    fn record(id: &str, amount: i64) -> SubscriptionRecord {
        SubscriptionRecord {
            subscription_id: id.to_string(),
            customer_id: format!("cus_{id}"),
            status: Some("active".to_string()),
            plan_amount: Some(amount),
            plan_interval: Some("month".to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn test_series_from_store() {
        let store = Arc::new(StaticStore::new(vec![record("a", 2900), record("b", 7900)]));
        let service = MrrService::new(store.clone(), MrrConfig::default());

        let rows = service.series(as_of()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.mrr_cents == 10800));
    }

    #[tokio::test]
    async fn test_each_call_refetches_without_cache() {
        let store = Arc::new(StaticStore::new(vec![record("a", 2900)]));
        let service = MrrService::new(store.clone(), MrrConfig::default());

        service.series(as_of()).await.unwrap();
        service.series(as_of()).await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_reuses_series_for_same_reference_date() {
        let store = Arc::new(StaticStore::new(vec![record("a", 2900)]));
        let config = MrrConfig {
            cache_ttl_seconds: 60,
            ..Default::default()
        };
        let service = MrrService::new(store.clone(), config);

        let first = service.series(as_of()).await.unwrap();
        let second = service.series(as_of()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);

        // different reference date is a different entry
        service
            .series(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);

        service.invalidate().await;
        service.series(as_of()).await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_distinct_error() {
        let service = MrrService::new(Arc::new(UnreachableStore), MrrConfig::default());
        let err = service.series(as_of()).await.unwrap_err();
        assert!(matches!(err, MrrError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_invalid_record_fails_computation() {
        let mut bad = record("bad", 100);
        bad.created_at = None;
        let store = Arc::new(StaticStore::new(vec![record("a", 2900), bad]));
        let service = MrrService::new(store, MrrConfig::default());

        let err = service.series(as_of()).await.unwrap_err();
        assert!(matches!(err, MrrError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_snapshot_handling() {
        let service = MrrService::new(Arc::new(StaticStore::new(vec![])), MrrConfig::default());
        assert!(service.series(as_of()).await.unwrap().is_empty());

        let strict = MrrService::new(
            Arc::new(StaticStore::new(vec![])),
            MrrConfig {
                require_data: true,
                ..Default::default()
            },
        );
        assert_eq!(strict.series(as_of()).await, Err(MrrError::EmptyInput));
    }

    #[tokio::test]
    async fn test_health_check_reflects_snapshot() {
        use crate::health::HealthStatus;

        let healthy = MrrService::new(
            Arc::new(StaticStore::new(vec![record("a", 2900)])),
            MrrConfig::default(),
        );
        let result = healthy.check().await;
        assert_eq!(result.status, HealthStatus::Healthy);
        assert!(result.details.unwrap()["months"].as_u64().unwrap() >= 1);

        let unreachable = MrrService::new(Arc::new(UnreachableStore), MrrConfig::default());
        assert_eq!(unreachable.check().await.status, HealthStatus::Unhealthy);

        let mut bad = record("bad", 100);
        bad.status = None;
        let invalid = MrrService::new(Arc::new(StaticStore::new(vec![bad])), MrrConfig::default());
        assert_eq!(invalid.check().await.status, HealthStatus::Degraded);
    }
}
