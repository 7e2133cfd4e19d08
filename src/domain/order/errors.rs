use uuid::Uuid;

use crate::domain::money::MoneyError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cannot modify order in status: {0}")]
    NotModifiable(OrderStatus),

    #[error("Item {item_id} does not belong to order {order_id}")]
    ForeignItem { item_id: Uuid, order_id: Uuid },

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(u32),

    #[error("Total quantity of product {0} is too large")]
    QuantityOverflow(Uuid),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error(transparent)]
    Money(#[from] MoneyError),
}
