use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::aggregate::Order;
use super::value_objects::{OrderItem, OrderStatus};

pub const PAYMENT_SUCCESS_MESSAGE: &str = "Payment processed successfully";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub message: String,
}

impl From<&Order> for CheckoutReceipt {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            status: order.status(),
            total: order.total().amount(),
            currency: order.currency().to_string(),
            paid_at: order.paid_at(),
            message: PAYMENT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl From<&OrderItem> for OrderItemDetail {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id(),
            product_id: item.product_id(),
            product_name: item.product_name().to_string(),
            unit_price: item.unit_price().amount(),
            quantity: item.quantity(),
            subtotal: item.subtotal().amount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub currency: String,
    pub items: Vec<OrderItemDetail>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderDetail {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            customer_id: order.customer_id(),
            status: order.status(),
            total: order.total().amount(),
            currency: order.currency().to_string(),
            items: order.items().iter().map(OrderItemDetail::from).collect(),
            created_at: order.created_at(),
            paid_at: order.paid_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total: Decimal,
    pub currency: String,
    pub item_count: usize,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            status: order.status(),
            total: order.total().amount(),
            currency: order.currency().to_string(),
            item_count: order.items().len(),
            created_at: order.created_at(),
            paid_at: order.paid_at(),
        }
    }
}
