use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub duration_ms: Option<u64>,
}

impl HealthCheckResult {
    fn new(
        status: HealthStatus,
        message: Option<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            status,
            message,
            details,
            duration_ms: None,
        }
    }

    pub fn healthy_with_details(details: serde_json::Value) -> Self {
        Self::new(HealthStatus::Healthy, None, Some(details))
    }

    pub fn degraded(message: String) -> Self {
        Self::new(HealthStatus::Degraded, Some(message), None)
    }

    pub fn degraded_with_details(message: String, details: serde_json::Value) -> Self {
        Self::new(HealthStatus::Degraded, Some(message), Some(details))
    }

    pub fn unhealthy(message: String) -> Self {
        Self::new(HealthStatus::Unhealthy, Some(message), None)
    }

    pub fn unhealthy_with_details(message: String, details: serde_json::Value) -> Self {
        Self::new(HealthStatus::Unhealthy, Some(message), Some(details))
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// The name of this health check component
    fn name(&self) -> &str;

    /// Perform the health check
    async fn check(&self) -> HealthCheckResult;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallHealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub checks: BTreeMap<String, HealthCheckResult>,
    pub summary: HealthSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total_checks: usize,
    pub healthy_count: usize,
    pub degraded_count: usize,
    pub unhealthy_count: usize,
    pub total_duration_ms: u64,
}

/// Aggregates component health checks for the `/health` endpoint
pub struct HealthService {
    checkers: RwLock<BTreeMap<String, Arc<dyn HealthChecker>>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self {
            checkers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a health checker, replacing any checker with the same name
    pub async fn register(&self, checker: Arc<dyn HealthChecker>) {
        let name = checker.name().to_string();
        self.checkers.write().await.insert(name, checker);
    }

    /// Run the checks selected by `filter`.
    ///
    /// `Some("all")` runs every checker, `Some(name)` runs only that one and
    /// `None` runs nothing, reporting liveness only.
    pub async fn check_health(&self, filter: Option<&str>) -> OverallHealthResponse {
        let checkers = self.checkers.read().await;
        let mut results = BTreeMap::new();
        let mut total_duration = 0u64;

        let selected = checkers.iter().filter(|(name, _)| match filter {
            Some("all") => true,
            Some(specific) => name.as_str() == specific,
            None => false,
        });

        for (name, checker) in selected {
            let start = Instant::now();
            let result = checker.check().await;
            let duration = start.elapsed().as_millis() as u64;
            total_duration += duration;
            results.insert(name.clone(), result.with_duration(duration));
        }

        let count = |status: HealthStatus| results.values().filter(|r| r.status == status).count();
        let healthy_count = count(HealthStatus::Healthy);
        let degraded_count = count(HealthStatus::Degraded);
        let unhealthy_count = count(HealthStatus::Unhealthy);

        // Worst status wins
        let status = if unhealthy_count > 0 {
            HealthStatus::Unhealthy
        } else if degraded_count > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let summary = HealthSummary {
            total_checks: results.len(),
            healthy_count,
            degraded_count,
            unhealthy_count,
            total_duration_ms: total_duration,
        };

        OverallHealthResponse {
            status,
            service: "mrr-dashboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks: results,
            summary,
        }
    }

    /// Names of all registered health checkers
    pub async fn get_registered_checkers(&self) -> Vec<String> {
        self.checkers.read().await.keys().cloned().collect()
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MockChecker {
        name: &'static str,
        status: HealthStatus,
    }

    #[async_trait]
    impl HealthChecker for MockChecker {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> HealthCheckResult {
            match self.status {
                HealthStatus::Healthy => {
                    HealthCheckResult::healthy_with_details(json!({"test": "passed"}))
                }
                HealthStatus::Degraded => HealthCheckResult::degraded("Slow".to_string()),
                HealthStatus::Unhealthy => HealthCheckResult::unhealthy("Down".to_string()),
            }
        }
    }

    fn mock(name: &'static str, status: HealthStatus) -> Arc<dyn HealthChecker> {
        Arc::new(MockChecker { name, status })
    }

    #[tokio::test]
    async fn test_register_and_check_all() {
        let service = HealthService::new();
        assert!(service.get_registered_checkers().await.is_empty());

        service.register(mock("database", HealthStatus::Healthy)).await;
        assert_eq!(service.get_registered_checkers().await, vec!["database"]);

        let response = service.check_health(Some("all")).await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.service, "mrr-dashboard");
        assert_eq!(response.summary.total_checks, 1);
        assert_eq!(response.summary.healthy_count, 1);
    }

    #[tokio::test]
    async fn test_worst_status_wins() {
        let service = HealthService::new();
        service.register(mock("a", HealthStatus::Healthy)).await;
        service.register(mock("b", HealthStatus::Degraded)).await;

        assert_eq!(
            service.check_health(Some("all")).await.status,
            HealthStatus::Degraded
        );

        service.register(mock("c", HealthStatus::Unhealthy)).await;
        let response = service.check_health(Some("all")).await;
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.summary.total_checks, 3);
        assert_eq!(response.summary.degraded_count, 1);
        assert_eq!(response.summary.unhealthy_count, 1);
    }

    #[tokio::test]
    async fn test_specific_and_empty_filters() {
        let service = HealthService::new();
        service.register(mock("database", HealthStatus::Healthy)).await;
        service.register(mock("mrr", HealthStatus::Unhealthy)).await;

        let response = service.check_health(Some("database")).await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert!(response.checks.contains_key("database"));
        assert!(!response.checks.contains_key("mrr"));

        let response = service.check_health(None).await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert!(response.checks.is_empty());

        let response = service.check_health(Some("unknown")).await;
        assert_eq!(response.summary.total_checks, 0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let result = HealthCheckResult::degraded("Warning".to_string()).with_duration(150);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["message"], "Warning");
        assert_eq!(value["duration_ms"], 150);
        assert!(value.get("details").is_none());
    }
}
