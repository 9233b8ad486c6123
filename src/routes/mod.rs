pub mod health;
pub mod mrr;

pub use health::create_health_routes;
pub use mrr::create_mrr_routes;
