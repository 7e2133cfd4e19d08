use std::time::Duration;

use uuid::Uuid;

use crate::auth::AuthError;
use crate::domain::money::MoneyError;
use crate::domain::order::OrderError;
use crate::domain::product::ProductError;
use crate::domain::repository::RepositoryError;
use crate::payment::PaymentError;
use crate::utils::IsTransient;

// ============================================================================
// Application Errors
// ============================================================================
//
// Everything a workflow can fail with. Callers branch on `kind()` instead of
// matching message text.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; the request can be corrected and resent.
    Validation,
    /// Referenced order or product does not exist (or is not the caller's).
    NotFound,
    /// Well-formed request the current state cannot satisfy.
    Domain,
    Unauthenticated,
    Forbidden,
    /// Storage or infrastructure failure; nothing was applied.
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("Order with id <{0}> not found")]
    OrderNotFound(Uuid),

    #[error("Product with id <{0}> not found")]
    ProductNotFound(Uuid),

    #[error("Product <{0}> referenced by the order no longer exists")]
    ProductGone(Uuid),

    #[error("Insufficient stock for product <{product_name}>: {available} available, {required} required")]
    InsufficientStock {
        product_name: String,
        available: u32,
        required: u32,
    },

    #[error("Payment failed: {0}")]
    PaymentFailed(#[from] PaymentError),

    #[error("Payment did not complete within {0:?}")]
    PaymentTimeout(Duration),

    #[error(transparent)]
    Order(OrderError),

    #[error(transparent)]
    Product(ProductError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Storage failure: {0}")]
    Storage(#[from] RepositoryError),

    /// The charge went through but the transaction could not be committed.
    #[error("Checkout could not be committed after payment: {0}")]
    CommitFailed(RepositoryError),
}

impl ShopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopError::OrderNotFound(_) | ShopError::ProductNotFound(_) => ErrorKind::NotFound,
            ShopError::ProductGone(_)
            | ShopError::InsufficientStock { .. }
            | ShopError::PaymentFailed(_) => ErrorKind::Domain,
            ShopError::Order(err) => match err {
                OrderError::EmptyItems
                | OrderError::InvalidQuantity(_)
                | OrderError::QuantityOverflow(_) => ErrorKind::Validation,
                OrderError::UnknownStatus(_) => ErrorKind::Internal,
                OrderError::Money(_) => ErrorKind::Validation,
                OrderError::InvalidTransition { .. }
                | OrderError::NotModifiable(_)
                | OrderError::ForeignItem { .. } => ErrorKind::Domain,
            },
            ShopError::Product(err) => match err {
                ProductError::InsufficientStock { .. } => ErrorKind::Domain,
                _ => ErrorKind::Validation,
            },
            ShopError::Money(_) => ErrorKind::Validation,
            ShopError::Auth(AuthError::Unauthenticated) => ErrorKind::Unauthenticated,
            ShopError::Auth(AuthError::Forbidden(_)) => ErrorKind::Forbidden,
            ShopError::PaymentTimeout(_) | ShopError::Storage(_) | ShopError::CommitFailed(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<OrderError> for ShopError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Money(money) => ShopError::Money(money),
            other => ShopError::Order(other),
        }
    }
}

impl From<ProductError> for ShopError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InsufficientStock {
                product_name,
                available,
                required,
            } => ShopError::InsufficientStock {
                product_name,
                available,
                required,
            },
            ProductError::Money(money) => ShopError::Money(money),
            other => ShopError::Product(other),
        }
    }
}

impl IsTransient for ShopError {
    fn is_transient(&self) -> bool {
        match self {
            ShopError::Storage(err) => err.is_transient(),
            _ => false,
        }
    }
}
