pub mod invoices;
pub mod subscriptions;

pub use invoices::Entity as Invoices;
pub use subscriptions::Entity as Subscriptions;

// Type aliases
pub type InvoiceRow = invoices::Model;
pub type SubscriptionRow = subscriptions::Model;
