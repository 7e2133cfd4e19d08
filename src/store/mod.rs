// ============================================================================
// Store Implementations
// ============================================================================
//
// - memory:   in-process store, units of work serialised behind one lock
// - postgres: sqlx-backed store, row locks via SELECT ... FOR UPDATE
//
// Both stage writes in the unit of work and apply them on flush.
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::{InMemoryStore, InMemoryUnitOfWork};
pub use postgres::{PgStore, PgUnitOfWork};

use uuid::Uuid;

use crate::domain::order::Order;
use crate::domain::product::Product;

/// A write staged by `save_*` / `remove_*`, applied in order on flush.
#[derive(Debug, Clone)]
pub(crate) enum PendingWrite {
    SaveProduct(Product),
    RemoveProduct(Uuid),
    SaveOrder(Order),
}
