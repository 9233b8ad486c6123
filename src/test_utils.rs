use crate::{
    config::Config,
    database::{DatabaseManager, DatabaseManagerImpl, DatabaseSubscriptionStore},
    mrr::{MrrConfig, SubscriptionRecord, SubscriptionStore},
    server::Server,
};
use chrono::Utc;
use std::sync::Arc;

/// Test server builder backed by in-memory SQLite
pub struct TestServerBuilder {
    config: Config,
    records: Vec<SubscriptionRecord>,
    store: Option<Arc<dyn SubscriptionStore>>,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.logging.log_request = false;
        Self {
            config,
            records: Vec::new(),
            store: None,
        }
    }

    /// Set a custom configuration; the database still runs in memory
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self.config.database.url = "sqlite::memory:".to_string();
        self
    }

    pub fn with_mrr_config(mut self, mrr: MrrConfig) -> Self {
        self.config.mrr = mrr;
        self
    }

    /// Seed the store with these records before the server is built
    pub fn with_records(mut self, records: Vec<SubscriptionRecord>) -> Self {
        self.records = records;
        self
    }

    /// Serve MRR from `store` instead of the database
    pub fn with_store(mut self, store: Arc<dyn SubscriptionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> Server {
        let database: Arc<dyn DatabaseManager> = Arc::new(
            DatabaseManagerImpl::new_from_config(&self.config.database)
                .await
                .unwrap(),
        );
        database.migrate().await.unwrap();

        if !self.records.is_empty() {
            database
                .subscriptions()
                .replace_all(&self.records, Utc::now())
                .await
                .unwrap();
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(DatabaseSubscriptionStore::new(database.clone())));

        Server::with_store(self.config, database, store).await
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
