//! MRR aggregation engine
//!
//! Turns a full snapshot of subscription records into a gapless monthly
//! series of normalized recurring revenue with month-over-month deltas.
//! The engine itself is pure; `service` is the invocation boundary that
//! fetches a snapshot from a store and runs the computation.

pub mod config;
pub mod demo;
pub mod engine;
pub mod month;
pub mod normalize;
pub mod service;
pub mod subscription;

pub use config::MrrConfig;
pub use engine::{MrrRow, compute_mrr};
pub use month::Month;
pub use service::{MrrService, SubscriptionStore};
pub use subscription::{
    PlanInterval, Subscription, SubscriptionRecord, SubscriptionStatus, ValidationError,
};

use thiserror::Error;

/// MRR computation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MrrError {
    #[error("Invalid subscription data: {0}")]
    Validation(#[from] ValidationError),
    #[error("No subscriptions available to compute MRR")]
    EmptyInput,
    #[error("Subscription store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type MrrResult<T> = Result<T, MrrError>;
