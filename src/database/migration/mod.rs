use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250301_000001_create_subscriptions_table;
mod m20250301_000002_create_invoices_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_subscriptions_table::Migration),
            Box::new(m20250301_000002_create_invoices_table::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum Subscriptions {
    Table,
    SubscriptionId,
    CustomerId,
    CustomerEmail,
    CustomerName,
    Status,
    PriceId,
    ProductId,
    PlanAmount,
    PlanInterval,
    PlanIntervalCount,
    Currency,
    Quantity,
    CreatedAt,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CanceledAt,
    CancelAtPeriodEnd,
    EndedAt,
    TrialStart,
    TrialEnd,
    ExtractedAt,
}

#[derive(Iden)]
pub enum Invoices {
    Table,
    InvoiceId,
    CustomerId,
    SubscriptionId,
    Status,
    AmountDue,
    AmountPaid,
    Currency,
    PeriodStart,
    PeriodEnd,
    CreatedAt,
    PaidAt,
    HostedInvoiceUrl,
    ExtractedAt,
}
