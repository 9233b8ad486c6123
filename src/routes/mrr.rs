use crate::{
    error::AppError,
    mrr::{MrrError, MrrRow, MrrService, demo::demo_series},
};
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct MrrQuery {
    /// Reference date `YYYY-MM-DD`; defaults to today (UTC)
    #[serde(default)]
    as_of: Option<String>,
}

/// Where the returned series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    Store,
    Demo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MrrResponse {
    pub status: String,
    pub source: SeriesSource,
    pub data: Vec<MrrRow>,
}

impl MrrResponse {
    fn ok(source: SeriesSource, data: Vec<MrrRow>) -> Self {
        Self {
            status: "ok".to_string(),
            source,
            data,
        }
    }
}

pub fn create_mrr_routes() -> Router<Arc<MrrService>> {
    Router::new().route("/mrr", get(get_mrr))
}

fn parse_as_of(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        None => Ok(Utc::now().date_naive()),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest(format!("as_of must be a YYYY-MM-DD date, got '{}'", value))
        }),
    }
}

async fn get_mrr(
    State(service): State<Arc<MrrService>>,
    Query(params): Query<MrrQuery>,
) -> Result<Json<MrrResponse>, AppError> {
    let as_of = parse_as_of(params.as_of.as_deref())?;

    match service.series(as_of).await {
        Ok(rows) => Ok(Json(MrrResponse::ok(SeriesSource::Store, rows))),
        Err(MrrError::StoreUnavailable(reason)) if service.config().demo_fallback => {
            warn!("Subscription store unavailable, serving demo series: {}", reason);
            Ok(Json(MrrResponse::ok(SeriesSource::Demo, demo_series())))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrr::{MrrConfig, MrrResult, SubscriptionRecord, SubscriptionStore};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::TimeZone;
    use serde_json::Value;
    use tower::ServiceExt;

    struct FixedStore(MrrResult<Vec<SubscriptionRecord>>);

    #[async_trait]
    impl SubscriptionStore for FixedStore {
        async fn fetch_subscriptions(&self) -> MrrResult<Vec<SubscriptionRecord>> {
            self.0.clone()
        }
    }

    fn active(id: &str, amount: i64) -> SubscriptionRecord {
        SubscriptionRecord {
            subscription_id: id.to_string(),
            customer_id: format!("cus_{id}"),
            status: Some("active".to_string()),
            plan_amount: Some(amount),
            plan_interval: Some("month".to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    async fn request(
        store: MrrResult<Vec<SubscriptionRecord>>,
        config: MrrConfig,
        uri: &str,
    ) -> (StatusCode, Value) {
        let service = Arc::new(MrrService::new(Arc::new(FixedStore(store)), config));
        let app = create_mrr_routes().with_state(service);

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_series_from_store() {
        let (status, body) = request(
            Ok(vec![active("a", 2900), active("b", 7900)]),
            MrrConfig::default(),
            "/mrr?as_of=2025-02-14",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["source"], "store");
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["month"], "2025-01");
        assert_eq!(data[0]["mrr_amount"], 108.0);
        assert_eq!(data[0]["mrr_change"], Value::Null);
        assert_eq!(data[1]["mrr_change"], 0.0);
    }

    #[tokio::test]
    async fn test_malformed_as_of_is_bad_request() {
        let (status, body) =
            request(Ok(vec![]), MrrConfig::default(), "/mrr?as_of=2025-13-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_unreachable_store_serves_demo() {
        let (status, body) = request(
            Err(MrrError::StoreUnavailable("refused".to_string())),
            MrrConfig::default(),
            "/mrr",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "demo");
        assert_eq!(
            body["data"].as_array().unwrap().len(),
            demo_series().len()
        );
    }

    #[tokio::test]
    async fn test_unreachable_store_without_fallback() {
        let config = MrrConfig {
            demo_fallback: false,
            ..Default::default()
        };
        let (status, body) = request(
            Err(MrrError::StoreUnavailable("refused".to_string())),
            config,
            "/mrr",
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "store_unavailable");
    }

    #[tokio::test]
    async fn test_invalid_store_data_is_not_masked_by_demo() {
        let mut bad = active("bad", 100);
        bad.plan_interval = None;
        let (status, body) = request(Ok(vec![bad]), MrrConfig::default(), "/mrr").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "invalid_subscription_data");
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_series() {
        let (status, body) = request(Ok(vec![]), MrrConfig::default(), "/mrr").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!([]));
    }
}
