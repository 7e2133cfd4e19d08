use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::money::Money;
use super::errors::ProductError;

// ============================================================================
// Product Entity - Catalog item with a guarded stock ledger
// ============================================================================
//
// Stock is only mutated through the ledger operations below, which keep it
// non-negative. Races between concurrent checkouts are handled by the unit
// of work (row locks), not here.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Money,
    stock: u32,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Flat persisted form of a product, as read from or written to storage.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        description: Option<String>,
        price: Money,
        stock: u32,
        image_url: Option<String>,
    ) -> Result<Self, ProductError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }

        Ok(Self {
            id,
            name,
            description,
            price,
            stock,
            image_url,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Rebuild a product from storage, re-checking the stock invariant.
    pub fn restore(record: ProductRecord) -> Result<Self, ProductError> {
        let stock = u32::try_from(record.stock).map_err(|_| ProductError::InvalidStock(record.stock))?;

        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            stock,
            image_url: record.image_url,
            active: record.active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            stock: i64::from(self.stock),
            image_url: self.image_url.clone(),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    // ------------------------------------------------------------------------
    // Stock ledger
    // ------------------------------------------------------------------------

    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }

    pub fn decrease_stock(&mut self, quantity: u32) -> Result<(), ProductError> {
        if quantity > self.stock {
            return Err(ProductError::InsufficientStock {
                product_name: self.name.clone(),
                available: self.stock,
                required: quantity,
            });
        }
        self.stock -= quantity;
        self.touch();
        Ok(())
    }

    pub fn increase_stock(&mut self, quantity: u32) {
        self.stock = self.stock.saturating_add(quantity);
        self.touch();
    }

    pub fn update_stock(&mut self, stock: i64) -> Result<(), ProductError> {
        let stock = u32::try_from(stock).map_err(|_| ProductError::InvalidStock(stock))?;
        self.stock = stock;
        self.touch();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Catalog maintenance
    // ------------------------------------------------------------------------

    pub fn update_info(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        price: Money,
    ) -> Result<(), ProductError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        self.name = name;
        self.description = description;
        self.price = price;
        self.touch();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
