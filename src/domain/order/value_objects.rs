use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::Money;
use super::errors::OrderError;

/// Largest quantity a single line may carry; order_items.quantity is an INTEGER.
pub const MAX_ITEM_QUANTITY: u32 = i32::MAX as u32;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn is_pending(&self) -> bool {
        *self == OrderStatus::Pending
    }

    pub fn can_be_paid(&self) -> bool {
        self.is_pending()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// A line of an order. Name and unit price are snapshots taken when the
/// order was created and never follow later catalog changes.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    unit_price: Money,
    quantity: u32,
    subtotal: Money,
}

impl OrderItem {
    pub fn new(
        id: Uuid,
        order_id: Uuid,
        product_id: Uuid,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, OrderError> {
        if quantity == 0 || quantity > MAX_ITEM_QUANTITY {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        let subtotal = unit_price.multiply(i64::from(quantity))?;

        Ok(Self {
            id,
            order_id,
            product_id,
            product_name: product_name.into(),
            unit_price,
            quantity,
            subtotal,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn unit_price(&self) -> &Money {
        &self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> &Money {
        &self.subtotal
    }
}

/// One requested cart line, as submitted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use rust_decimal::Decimal;

    #[test]
    fn test_order_item_computes_subtotal() {
        let item = OrderItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Desk Lamp",
            Money::from_minor(1000, Currency::eur()).unwrap(),
            2,
        )
        .unwrap();

        assert_eq!(item.subtotal().amount(), Decimal::new(2000, 2));
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.product_name(), "Desk Lamp");
    }

    #[test]
    fn test_order_item_rejects_zero_quantity() {
        let result = OrderItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Desk Lamp",
            Money::from_minor(1000, Currency::eur()).unwrap(),
            0,
        );
        assert!(matches!(result, Err(OrderError::InvalidQuantity(0))));
    }

    #[test]
    fn test_order_item_quantity_fits_storage() {
        let item = |quantity| {
            OrderItem::new(
                Uuid::new_v4(),
                Uuid::new_v4(),
                Uuid::new_v4(),
                "Sticker",
                Money::from_minor(1, Currency::eur()).unwrap(),
                quantity,
            )
        };
        assert_eq!(item(MAX_ITEM_QUANTITY).unwrap().quantity(), MAX_ITEM_QUANTITY);
        assert!(matches!(
            item(3_000_000_000),
            Err(OrderError::InvalidQuantity(3_000_000_000))
        ));
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
            OrderStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!(matches!("shipped".parse::<OrderStatus>(), Err(OrderError::UnknownStatus(_))));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
    }

    #[test]
    fn test_only_pending_can_be_paid() {
        assert!(OrderStatus::Pending.can_be_paid());
        assert!(!OrderStatus::Paid.can_be_paid());
        assert!(!OrderStatus::Cancelled.can_be_paid());
        assert!(!OrderStatus::Completed.can_be_paid());
    }
}
