use super::DatabaseManager;
use crate::mrr::{MrrError, MrrResult, SubscriptionRecord, SubscriptionStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads the full subscription snapshot from the database
pub struct DatabaseSubscriptionStore {
    database: Arc<dyn DatabaseManager>,
}

impl DatabaseSubscriptionStore {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl SubscriptionStore for DatabaseSubscriptionStore {
    async fn fetch_subscriptions(&self) -> MrrResult<Vec<SubscriptionRecord>> {
        self.database
            .subscriptions()
            .snapshot()
            .await
            .map_err(|e| MrrError::StoreUnavailable(e.to_string()))
    }
}
