// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderItem, OrderStatus, OrderLine)
// - Commands (CreateOrder, CheckoutOrder, CancelOrder, ...)
// - Errors (OrderError enum)
// - Aggregate (Order and its state machine)
// - Repository (OrderRepository)
// - Command Handler (OrderCommandHandler)
// - Views returned to callers
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod repository;
pub mod command_handler;
pub mod views;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use repository::*;
pub use command_handler::*;
pub use views::*;
