use super::Subscriptions;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::SubscriptionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::CustomerId).string().not_null())
                    .col(ColumnDef::new(Subscriptions::CustomerEmail).string().null())
                    .col(ColumnDef::new(Subscriptions::CustomerName).string().null())
                    .col(ColumnDef::new(Subscriptions::Status).string_len(32).null())
                    .col(ColumnDef::new(Subscriptions::PriceId).string().null())
                    .col(ColumnDef::new(Subscriptions::ProductId).string().null())
                    .col(ColumnDef::new(Subscriptions::PlanAmount).big_integer().null())
                    .col(
                        ColumnDef::new(Subscriptions::PlanInterval)
                            .string_len(16)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::PlanIntervalCount)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Subscriptions::Currency).string_len(8).null())
                    .col(ColumnDef::new(Subscriptions::Quantity).big_integer().null())
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CanceledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CancelAtPeriodEnd)
                            .boolean()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::EndedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::TrialStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::TrialEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::ExtractedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on created_at for the month spine lower bound
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_created_at")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_customer_id")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await
    }
}
