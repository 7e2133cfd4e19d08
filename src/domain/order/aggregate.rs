use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::money::{Currency, Money};
use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// State machine:
//
//   pending ──mark_as_paid──▶ paid
//      │
//      └─────cancel─────────▶ cancelled
//
// `paid` and `cancelled` are terminal. `completed` is a known stored status
// with no transition into it yet.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    // Identity
    id: Uuid,
    customer_id: Uuid,

    // Current State
    items: Vec<OrderItem>,
    status: OrderStatus,
    total: Money,

    // Audit Trail
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

/// Order header as persisted; items are stored separately.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(id: Uuid, customer_id: Uuid, currency: Currency) -> Self {
        Self {
            id,
            customer_id,
            items: Vec::new(),
            status: OrderStatus::Pending,
            total: Money::zero(currency),
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    /// Rebuild from storage. The total is derived from the items again rather
    /// than trusted from the stored column.
    pub fn restore(record: OrderRecord, items: Vec<OrderItem>) -> Result<Self, OrderError> {
        let mut order = Self {
            id: record.id,
            customer_id: record.customer_id,
            items: Vec::new(),
            status: record.status,
            total: Money::zero(record.currency),
            created_at: record.created_at,
            paid_at: record.paid_at,
        };

        for item in &items {
            order.ensure_item_fits(item)?;
        }
        order.items = items;
        order.recalculate_total()?;

        Ok(order)
    }

    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id,
            customer_id: self.customer_id,
            status: self.status,
            currency: self.currency().clone(),
            created_at: self.created_at,
            paid_at: self.paid_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total(&self) -> &Money {
        &self.total
    }

    pub fn currency(&self) -> &Currency {
        self.total.currency()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn belongs_to_customer(&self, customer_id: Uuid) -> bool {
        self.customer_id == customer_id
    }

    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        if !self.status.is_pending() {
            return Err(OrderError::NotModifiable(self.status));
        }
        self.ensure_item_fits(&item)?;

        // Compute the new total before touching the item list so a failure
        // leaves the order as it was.
        let total = self.total.add(item.subtotal())?;
        self.items.push(item);
        self.total = total;
        Ok(())
    }

    pub fn mark_as_paid(&mut self) -> Result<(), OrderError> {
        if !self.status.can_be_paid() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Paid,
            });
        }
        self.status = OrderStatus::Paid;
        self.paid_at = Some(Utc::now());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.is_pending() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Cancelled,
            });
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    fn ensure_item_fits(&self, item: &OrderItem) -> Result<(), OrderError> {
        if item.order_id() != self.id {
            return Err(OrderError::ForeignItem {
                item_id: item.id(),
                order_id: self.id,
            });
        }
        Ok(())
    }

    fn recalculate_total(&mut self) -> Result<(), OrderError> {
        let mut total = Money::zero(self.currency().clone());
        for item in &self.items {
            total = total.add(item.subtotal())?;
        }
        self.total = total;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
