use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::aggregate::Product;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub stock: u32,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            description: product.description().map(str::to_string),
            price: product.price().amount(),
            currency: product.price().currency().to_string(),
            stock: product.stock(),
            image_url: product.image_url().map(str::to_string),
            active: product.is_active(),
            created_at: product.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let limit_u64 = u64::from(limit.max(1));
        Self {
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit_u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub data: Vec<ProductSummary>,
    pub meta: PageMeta,
}
