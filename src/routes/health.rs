use crate::{error::AppError, health::HealthService};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct HealthCheckQuery {
    #[serde(default)]
    check: Option<String>,
}

/// Create health check routes
///
/// `?check=all` runs every registered checker (database, mrr), `?check=<name>`
/// runs one, and no parameter reports liveness only.
pub fn create_health_routes() -> Router<Arc<HealthService>> {
    Router::new().route("/", get(health_check))
}

async fn health_check(
    State(health_service): State<Arc<HealthService>>,
    Query(params): Query<HealthCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let health_response = health_service.check_health(params.check.as_deref()).await;

    let response_json = serde_json::to_value(&health_response)
        .map_err(|e| AppError::Internal(format!("Failed to serialize health response: {}", e)))?;

    Ok(Json(response_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthCheckResult, HealthChecker};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    struct DownChecker;

    #[async_trait]
    impl HealthChecker for DownChecker {
        fn name(&self) -> &str {
            "database"
        }

        async fn check(&self) -> HealthCheckResult {
            HealthCheckResult::unhealthy("connection refused".to_string())
        }
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let health_service = Arc::new(HealthService::new());
        health_service.register(Arc::new(DownChecker)).await;
        let app = create_health_routes().with_state(health_service);

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_basic() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["summary"]["total_checks"], 0);
    }

    #[tokio::test]
    async fn test_health_check_with_all_query() {
        let (status, body) = get_json("/?check=all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["checks"]["database"]["message"], "connection refused");
    }

    #[tokio::test]
    async fn test_health_check_with_unknown_query() {
        let (status, body) = get_json("/?check=unknown").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
