use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::money::DEFAULT_CURRENCY;

// ============================================================================
// Product Commands & Queries
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub stock: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListProducts {
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ListProducts {
    fn default() -> Self {
        Self {
            search: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

pub const MAX_PAGE_SIZE: u32 = 100;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}
