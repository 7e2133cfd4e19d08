use uuid::Uuid;

use crate::payment::PaymentMethod;
use super::value_objects::OrderLine;

// ============================================================================
// Order Commands & Queries - Represent caller intent
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone)]
pub struct CheckoutOrder {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub payment_method: PaymentMethod,
}

impl CheckoutOrder {
    /// Checkout through the simulated processor.
    pub fn simulated(order_id: Uuid, customer_id: Uuid) -> Self {
        Self {
            order_id,
            customer_id,
            payment_method: PaymentMethod::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetOrderDetail {
    pub order_id: Uuid,
    pub customer_id: Uuid,
}

#[derive(Debug, Clone, Copy)]
pub struct CancelOrder {
    pub order_id: Uuid,
    pub customer_id: Uuid,
}
