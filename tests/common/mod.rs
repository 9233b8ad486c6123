use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use mrr_dashboard::{Server, mrr::SubscriptionRecord, test_utils::TestServerBuilder};
use serde_json::Value;
use tower::ServiceExt;

/// Test harness wrapping a server and its router
pub struct TestHarness {
    #[allow(dead_code)]
    pub server: Server,
    pub app: Router,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::from_builder(TestServerBuilder::new()).await
    }

    pub async fn with_records(records: Vec<SubscriptionRecord>) -> Self {
        Self::from_builder(TestServerBuilder::new().with_records(records)).await
    }

    pub async fn from_builder(builder: TestServerBuilder) -> Self {
        let server = builder.build().await;
        let app = server.create_app();
        Self { server, app }
    }

    /// Issue a GET and decode the JSON body
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

/// Active monthly subscription created on the given day of 2025
#[allow(dead_code)]
pub fn monthly(id: &str, amount: i64, month: u32, day: u32) -> SubscriptionRecord {
    SubscriptionRecord {
        subscription_id: id.to_string(),
        customer_id: format!("cus_{id}"),
        status: Some("active".to_string()),
        plan_amount: Some(amount),
        plan_interval: Some("month".to_string()),
        plan_interval_count: Some(1),
        quantity: Some(1),
        currency: Some("usd".to_string()),
        created_at: Some(Utc.with_ymd_and_hms(2025, month, day, 0, 0, 0).unwrap()),
        cancel_at_period_end: Some(false),
        ..Default::default()
    }
}

/// $29/mo from January, $790/yr from February, $79/mo canceled mid-February
#[allow(dead_code)]
pub fn three_subscription_snapshot() -> Vec<SubscriptionRecord> {
    let a = monthly("sub_a", 2900, 1, 1);

    let mut b = monthly("sub_b", 79000, 2, 1);
    b.plan_interval = Some("year".to_string());

    let mut c = monthly("sub_c", 7900, 1, 1);
    c.status = Some("canceled".to_string());
    c.canceled_at = Some(Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap());

    vec![a, b, c]
}
