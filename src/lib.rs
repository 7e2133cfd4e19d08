// ============================================================================
// Shop Checkout - catalog, orders and a transactional checkout
// ============================================================================
//
// Layers:
// - domain:  aggregates, repository traits, command handlers
// - store:   in-memory and PostgreSQL units of work
// - payment: gateway seam (simulated processor)
// - shop:    facade that authorizes callers and dispatches workflows
//
// ============================================================================

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod payment;
pub mod shop;
pub mod store;
pub mod utils;

pub use errors::{ErrorKind, ShopError};
pub use shop::Shop;
