use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::domain::ids::UuidGenerator;
use crate::domain::product::Product;
use crate::domain::repository::{discard, Store, UnitOfWork};
use crate::errors::ShopError;
use crate::metrics::ShopMetrics;
use crate::payment::{PaymentGateway, PaymentReceipt, PaymentRequest};
use crate::utils::{retry_on_transient, RetryPolicy};

use super::aggregate::Order;
use super::commands::{CancelOrder, CheckoutOrder, CreateOrder, GetOrderDetail};
use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderLine, OrderStatus, MAX_ITEM_QUANTITY};
use super::views::{CheckoutReceipt, OrderDetail, OrderSummary};

pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Unit of Work → Aggregates → Commit
//
// Checkout runs as one unit of work:
//   lock order → lock products (ascending id) → validate stock
//   → charge → decrement stock → mark paid → commit
//
// Every failure before commit rolls the unit back, so orders and products
// are left exactly as they were.
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn Store>,
    ids: Arc<dyn UuidGenerator>,
    payments: Arc<dyn PaymentGateway>,
    metrics: Arc<ShopMetrics>,
    payment_timeout: Duration,
    retry: RetryPolicy,
}

impl OrderCommandHandler {
    pub fn new(
        store: Arc<dyn Store>,
        ids: Arc<dyn UuidGenerator>,
        payments: Arc<dyn PaymentGateway>,
        metrics: Arc<ShopMetrics>,
    ) -> Self {
        Self {
            store,
            ids,
            payments,
            metrics,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    // ========================================================================
    // Create Order
    // ========================================================================

    pub async fn create_order(&self, command: CreateOrder) -> Result<Uuid, ShopError> {
        if command.items.is_empty() {
            return Err(OrderError::EmptyItems.into());
        }
        if let Some(line) = command
            .items
            .iter()
            .find(|line| line.quantity == 0 || line.quantity > MAX_ITEM_QUANTITY)
        {
            return Err(OrderError::InvalidQuantity(line.quantity).into());
        }
        required_quantities(command.items.iter().copied())?;

        let command = &command;
        retry_on_transient(&self.retry, "create_order", move |attempt| {
            if attempt > 1 {
                self.metrics.record_retry("create_order");
            }
            self.create_order_once(command)
        })
        .await
    }

    async fn create_order_once(&self, command: &CreateOrder) -> Result<Uuid, ShopError> {
        let order_id = self.ids.generate();
        let mut uow = self.store.begin().await?;

        match self.build_order(&mut *uow, order_id, command).await {
            Ok(order) => {
                uow.save_order(&order);
                uow.commit().await?;

                self.metrics.orders_created.inc();
                tracing::info!(
                    order_id = %order.id(),
                    customer_id = %order.customer_id(),
                    item_count = order.items().len(),
                    total = %order.total(),
                    "Order created"
                );
                Ok(order.id())
            }
            Err(e) => {
                discard(uow).await;
                Err(e)
            }
        }
    }

    async fn build_order(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
        command: &CreateOrder,
    ) -> Result<Order, ShopError> {
        let mut order: Option<Order> = None;

        for line in &command.items {
            let product = uow
                .find_product(line.product_id)
                .await?
                .ok_or(ShopError::ProductNotFound(line.product_id))?;

            // The first product decides the order currency
            let current = order.get_or_insert_with(|| {
                Order::new(order_id, command.customer_id, product.price().currency().clone())
            });

            let item = OrderItem::new(
                self.ids.generate(),
                order_id,
                product.id(),
                product.name(),
                product.price().clone(),
                line.quantity,
            )?;
            current.add_item(item)?;
        }

        order.ok_or_else(|| OrderError::EmptyItems.into())
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    pub async fn checkout(&self, command: CheckoutOrder) -> Result<CheckoutReceipt, ShopError> {
        let started = Instant::now();

        let command = &command;
        let result = retry_on_transient(&self.retry, "checkout", move |attempt| {
            if attempt > 1 {
                self.metrics.record_retry("checkout");
            }
            self.checkout_once(command)
        })
        .await;

        let outcome = checkout_outcome(&result);
        self.metrics
            .record_checkout(outcome, started.elapsed().as_secs_f64());

        match &result {
            Ok(receipt) => tracing::info!(
                order_id = %receipt.order_id,
                customer_id = %command.customer_id,
                total = %receipt.total,
                currency = %receipt.currency,
                "Order paid"
            ),
            Err(e) => tracing::warn!(
                order_id = %command.order_id,
                customer_id = %command.customer_id,
                outcome,
                error = %e,
                "Checkout rejected"
            ),
        }

        result
    }

    async fn checkout_once(&self, command: &CheckoutOrder) -> Result<CheckoutReceipt, ShopError> {
        let mut uow = self.store.begin().await?;

        let order = match self.pay_order(&mut *uow, command).await {
            Ok(order) => order,
            Err(e) => {
                discard(uow).await;
                return Err(e);
            }
        };

        // The charge has gone through; a storage failure from here on must
        // not be retried.
        uow.commit().await.map_err(ShopError::CommitFailed)?;

        Ok(CheckoutReceipt::from(&order))
    }

    async fn pay_order(
        &self,
        uow: &mut dyn UnitOfWork,
        command: &CheckoutOrder,
    ) -> Result<Order, ShopError> {
        let mut order = uow
            .find_order_for_update(command.order_id, command.customer_id)
            .await?
            .ok_or(ShopError::OrderNotFound(command.order_id))?;

        if !order.status().can_be_paid() {
            return Err(OrderError::InvalidTransition {
                from: order.status(),
                to: OrderStatus::Paid,
            }
            .into());
        }

        // Ascending id order keeps concurrent checkouts from deadlocking
        let required = required_quantities(order.items().iter().map(|item| OrderLine {
            product_id: item.product_id(),
            quantity: item.quantity(),
        }))?;

        let mut products: Vec<(Product, u32)> = Vec::with_capacity(required.len());
        for (product_id, quantity) in required {
            let product = uow
                .find_product_for_update(product_id)
                .await?
                .ok_or(ShopError::ProductGone(product_id))?;

            if !product.has_stock(quantity) {
                return Err(ShopError::InsufficientStock {
                    product_name: product.name().to_string(),
                    available: product.stock(),
                    required: quantity,
                });
            }
            products.push((product, quantity));
        }

        let receipt = self.charge(&order, command).await?;
        tracing::debug!(
            order_id = %order.id(),
            reference = %receipt.reference,
            method = %receipt.method,
            "Payment captured"
        );

        for (product, quantity) in &mut products {
            product.decrease_stock(*quantity)?;
            uow.save_product(product);
        }

        order.mark_as_paid()?;
        uow.save_order(&order);

        Ok(order)
    }

    async fn charge(&self, order: &Order, command: &CheckoutOrder) -> Result<PaymentReceipt, ShopError> {
        let request = PaymentRequest {
            order_id: order.id(),
            customer_id: order.customer_id(),
            amount: order.total().clone(),
            method: command.payment_method.clone(),
        };

        match tokio::time::timeout(self.payment_timeout, self.payments.charge(&request)).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => Err(ShopError::PaymentFailed(e)),
            Err(_) => Err(ShopError::PaymentTimeout(self.payment_timeout)),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get_order_detail(&self, query: GetOrderDetail) -> Result<OrderDetail, ShopError> {
        let mut uow = self.store.begin().await?;
        let order = uow.find_order(query.order_id, query.customer_id).await;
        uow.rollback().await?;

        let order = order?
            .filter(|order| order.belongs_to_customer(query.customer_id))
            .ok_or(ShopError::OrderNotFound(query.order_id))?;

        tracing::debug!(order_id = %order.id(), status = %order.status(), "Loaded order detail");
        Ok(OrderDetail::from(&order))
    }

    pub async fn list_orders(&self, customer_id: Uuid) -> Result<Vec<OrderSummary>, ShopError> {
        let mut uow = self.store.begin().await?;
        let orders = uow.find_orders_by_customer(customer_id).await;
        uow.rollback().await?;

        let orders = orders?;
        tracing::debug!(customer_id = %customer_id, count = orders.len(), "Listed orders");
        Ok(orders.iter().map(OrderSummary::from).collect())
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    pub async fn cancel_order(&self, command: CancelOrder) -> Result<OrderSummary, ShopError> {
        let mut uow = self.store.begin().await?;

        let result = async {
            let mut order = uow
                .find_order_for_update(command.order_id, command.customer_id)
                .await?
                .ok_or(ShopError::OrderNotFound(command.order_id))?;
            order.cancel()?;
            uow.save_order(&order);
            Ok::<_, ShopError>(order)
        }
        .await;

        let order = match result {
            Ok(order) => order,
            Err(e) => {
                discard(uow).await;
                return Err(e);
            }
        };
        uow.commit().await?;

        self.metrics.orders_cancelled.inc();
        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            "Order cancelled"
        );

        Ok(OrderSummary::from(&order))
    }
}

/// Label for `checkouts_total{outcome}`.
/// Quantity per product across all lines, keyed in ascending id order.
fn required_quantities(
    lines: impl IntoIterator<Item = OrderLine>,
) -> Result<BTreeMap<Uuid, u32>, OrderError> {
    let mut required: BTreeMap<Uuid, u32> = BTreeMap::new();
    for line in lines {
        let total = required.entry(line.product_id).or_default();
        *total = total
            .checked_add(line.quantity)
            .filter(|sum| *sum <= MAX_ITEM_QUANTITY)
            .ok_or(OrderError::QuantityOverflow(line.product_id))?;
    }
    Ok(required)
}

fn checkout_outcome(result: &Result<CheckoutReceipt, ShopError>) -> &'static str {
    match result {
        Ok(_) => "paid",
        Err(ShopError::OrderNotFound(_)) => "order_not_found",
        Err(ShopError::InsufficientStock { .. }) => "insufficient_stock",
        Err(ShopError::ProductGone(_)) => "product_gone",
        Err(ShopError::PaymentFailed(_)) => "payment_failed",
        Err(ShopError::PaymentTimeout(_)) => "payment_timeout",
        Err(ShopError::Order(OrderError::InvalidTransition { .. })) => "invalid_transition",
        Err(_) => "error",
    }
}
