use crate::domain::money::MoneyError;

// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("Insufficient stock for product <{product_name}>: {available} available, {required} required")]
    InsufficientStock {
        product_name: String,
        available: u32,
        required: u32,
    },

    #[error("Stock cannot be negative: {0}")]
    InvalidStock(i64),

    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Invalid pagination: page {page}, limit {limit}")]
    InvalidPagination { page: u32, limit: u32 },

    #[error(transparent)]
    Money(#[from] MoneyError),
}
