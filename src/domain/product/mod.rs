// ============================================================================
// Product Domain - Catalog entries and the stock ledger
// ============================================================================

pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod repository;
pub mod command_handler;
pub mod views;

pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use repository::*;
pub use command_handler::*;
pub use views::*;
