//! Core business logic: orchestrates the durable and cache tiers behind a
//! stable API the gRPC adapter calls into.

pub mod customer_service;
pub mod menu_service;
pub mod order_service;
pub mod tab_service;

pub use customer_service::CustomerService;
pub use menu_service::MenuService;
pub use order_service::OrderService;
pub use tab_service::TabService;

/// Bound on optimistic cache-transaction retries before surfacing `Conflict`.
pub(crate) const MAX_CACHE_RETRIES: u32 = 5;
