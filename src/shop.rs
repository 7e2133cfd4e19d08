use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::auth::{authorize, require_user, CurrentUser, Endpoint};
use crate::domain::ids::UuidGenerator;
use crate::domain::order::{
    CancelOrder, CheckoutOrder, CheckoutReceipt, CreateOrder, GetOrderDetail, OrderCommandHandler,
    OrderDetail, OrderLine, OrderSummary,
};
use crate::domain::product::{CreateProduct, ListProducts, ProductCommandHandler, ProductPage};
use crate::domain::repository::Store;
use crate::errors::ShopError;
use crate::metrics::ShopMetrics;
use crate::payment::{PaymentGateway, PaymentMethod};
use crate::utils::RetryPolicy;

// ============================================================================
// Shop - the application boundary
// ============================================================================
//
// Every call names the caller. Access is checked against the endpoint table
// before a workflow runs, and order endpoints always act on the caller's own
// orders.
//
// ============================================================================

pub struct Shop {
    products: ProductCommandHandler,
    orders: OrderCommandHandler,
    metrics: Arc<ShopMetrics>,
}

impl Shop {
    pub fn new(
        store: Arc<dyn Store>,
        ids: Arc<dyn UuidGenerator>,
        payments: Arc<dyn PaymentGateway>,
        metrics: Arc<ShopMetrics>,
    ) -> Self {
        Self {
            products: ProductCommandHandler::new(store.clone(), ids.clone(), metrics.clone()),
            orders: OrderCommandHandler::new(store, ids, payments, metrics.clone()),
            metrics,
        }
    }

    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.orders = self.orders.with_payment_timeout(timeout);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.orders = self.orders.with_retry_policy(policy);
        self
    }

    pub fn metrics(&self) -> &Arc<ShopMetrics> {
        &self.metrics
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn list_products(
        &self,
        user: Option<&CurrentUser>,
        query: ListProducts,
    ) -> Result<ProductPage, ShopError> {
        authorize(Endpoint::ListProducts, user)?;
        self.products.list_products(query).await
    }

    pub async fn create_product(
        &self,
        user: Option<&CurrentUser>,
        command: CreateProduct,
    ) -> Result<Uuid, ShopError> {
        let admin = require_user(Endpoint::CreateProduct, user)?;
        tracing::debug!(admin_id = %admin.id, name = %command.name, "Creating product");
        self.products.create_product(command).await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    pub async fn create_order(
        &self,
        user: Option<&CurrentUser>,
        items: Vec<OrderLine>,
    ) -> Result<Uuid, ShopError> {
        let customer = require_user(Endpoint::CreateOrder, user)?;
        self.orders
            .create_order(CreateOrder {
                customer_id: customer.id,
                items,
            })
            .await
    }

    pub async fn list_orders(&self, user: Option<&CurrentUser>) -> Result<Vec<OrderSummary>, ShopError> {
        let customer = require_user(Endpoint::ListOrders, user)?;
        self.orders.list_orders(customer.id).await
    }

    pub async fn get_order_detail(
        &self,
        user: Option<&CurrentUser>,
        order_id: Uuid,
    ) -> Result<OrderDetail, ShopError> {
        let customer = require_user(Endpoint::GetOrderDetail, user)?;
        self.orders
            .get_order_detail(GetOrderDetail {
                order_id,
                customer_id: customer.id,
            })
            .await
    }

    pub async fn checkout(
        &self,
        user: Option<&CurrentUser>,
        order_id: Uuid,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutReceipt, ShopError> {
        let customer = require_user(Endpoint::CheckoutOrder, user)?;
        self.orders
            .checkout(CheckoutOrder {
                order_id,
                customer_id: customer.id,
                payment_method,
            })
            .await
    }

    pub async fn cancel_order(
        &self,
        user: Option<&CurrentUser>,
        order_id: Uuid,
    ) -> Result<OrderSummary, ShopError> {
        let customer = require_user(Endpoint::CancelOrder, user)?;
        self.orders
            .cancel_order(CancelOrder {
                order_id,
                customer_id: customer.id,
            })
            .await
    }
}
