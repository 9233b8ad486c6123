use super::INSERT_CHUNK_SIZE;
use crate::database::entities::{InvoiceRow, invoices};
use crate::database::{DatabaseError, DatabaseResult};
use crate::ingest::InvoiceRecord;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

/// Invoices DAO for database operations
pub struct InvoicesDao {
    db: DatabaseConnection,
}

impl InvoicesDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every stored invoice, ordered by id
    pub async fn all(&self) -> DatabaseResult<Vec<InvoiceRow>> {
        invoices::Entity::find()
            .order_by_asc(invoices::Column::InvoiceId)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Invoices billed against one subscription, oldest first
    pub async fn for_subscription(&self, subscription_id: &str) -> DatabaseResult<Vec<InvoiceRow>> {
        invoices::Entity::find()
            .filter(invoices::Column::SubscriptionId.eq(subscription_id))
            .order_by_asc(invoices::Column::CreatedAt)
            .order_by_asc(invoices::Column::InvoiceId)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn count(&self) -> DatabaseResult<u64> {
        invoices::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Replace every stored invoice with `records` in a single transaction
    pub async fn replace_all(
        &self,
        records: &[InvoiceRecord],
        extracted_at: DateTime<Utc>,
    ) -> DatabaseResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        invoices::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let mut written = 0;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk
                .iter()
                .map(|record| invoices::ActiveModel::from_record(record, extracted_at));

            written += invoices::Entity::insert_many(models)
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
