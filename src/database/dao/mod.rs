pub mod invoices;
pub mod subscriptions;

pub use invoices::InvoicesDao;
pub use subscriptions::SubscriptionsDao;

/// Rows per INSERT statement, kept below SQLite's bound parameter limit
const INSERT_CHUNK_SIZE: usize = 40;
