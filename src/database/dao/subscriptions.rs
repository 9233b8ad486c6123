use super::INSERT_CHUNK_SIZE;
use crate::database::entities::{SubscriptionRow, subscriptions};
use crate::database::{DatabaseError, DatabaseResult};
use crate::mrr::SubscriptionRecord;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, TransactionTrait};

/// Subscriptions DAO for database operations
pub struct SubscriptionsDao {
    db: DatabaseConnection,
}

impl SubscriptionsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every stored subscription, ordered by id
    pub async fn all(&self) -> DatabaseResult<Vec<SubscriptionRow>> {
        subscriptions::Entity::find()
            .order_by_asc(subscriptions::Column::SubscriptionId)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Full snapshot as raw records
    pub async fn snapshot(&self) -> DatabaseResult<Vec<SubscriptionRecord>> {
        Ok(self.all().await?.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(
        &self,
        subscription_id: &str,
    ) -> DatabaseResult<Option<SubscriptionRow>> {
        subscriptions::Entity::find_by_id(subscription_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn count(&self) -> DatabaseResult<u64> {
        subscriptions::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Replace the stored snapshot with `records` in a single transaction.
    ///
    /// Returns the number of rows written. On any failure the previous
    /// snapshot is left untouched.
    pub async fn replace_all(
        &self,
        records: &[SubscriptionRecord],
        extracted_at: DateTime<Utc>,
    ) -> DatabaseResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        subscriptions::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let mut written = 0;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk
                .iter()
                .map(|record| subscriptions::ActiveModel::from_record(record, extracted_at));

            written += subscriptions::Entity::insert_many(models)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| DatabaseError::Constraint(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(written)
    }
}
