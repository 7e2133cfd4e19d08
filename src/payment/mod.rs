use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::Money;

// ============================================================================
// Payment Gateway
// ============================================================================
//
// Checkout charges through this trait. The only implementation shipped is
// the simulated processor, which always approves. A failed charge is final
// for that checkout attempt and is never retried.
//
// ============================================================================

pub const SIMULATED_METHOD: &str = "simulated";

/// Opaque payment method label supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub fn new(method: impl Into<String>) -> Self {
        let method = method.into();
        if method.trim().is_empty() {
            return Self::default();
        }
        Self(method)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self(SIMULATED_METHOD.to_string())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Money,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub method: PaymentMethod,
    pub amount: Money,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment processor unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Stand-in processor: approves every charge immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedPaymentGateway;

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        tracing::debug!(
            order_id = %request.order_id,
            amount = %request.amount,
            method = %request.method,
            "Simulating payment"
        );

        Ok(PaymentReceipt {
            reference: format!("sim-{}", request.order_id),
            method: request.method.clone(),
            amount: request.amount.clone(),
            processed_at: Utc::now(),
        })
    }
}
