use std::sync::Arc;
use uuid::Uuid;

use crate::domain::ids::UuidGenerator;
use crate::domain::money::{Currency, Money};
use crate::domain::repository::Store;
use crate::errors::ShopError;
use crate::metrics::ShopMetrics;

use super::aggregate::Product;
use super::commands::{CreateProduct, ListProducts, MAX_PAGE_SIZE};
use super::errors::ProductError;
use super::views::{PageMeta, ProductPage, ProductSummary};

// ============================================================================
// Product Command Handler
// ============================================================================
//
// Catalog writes (admin) and the public listing.
//
// ============================================================================

pub struct ProductCommandHandler {
    store: Arc<dyn Store>,
    ids: Arc<dyn UuidGenerator>,
    metrics: Arc<ShopMetrics>,
}

impl ProductCommandHandler {
    pub fn new(store: Arc<dyn Store>, ids: Arc<dyn UuidGenerator>, metrics: Arc<ShopMetrics>) -> Self {
        Self { store, ids, metrics }
    }

    pub async fn create_product(&self, command: CreateProduct) -> Result<Uuid, ShopError> {
        let price = Money::new(command.price, Currency::new(&command.currency)?)?;
        // products.stock is an INTEGER
        let stock = i32::try_from(command.stock)
            .ok()
            .and_then(|stock| u32::try_from(stock).ok())
            .ok_or(ProductError::InvalidStock(command.stock))?;

        let product = Product::new(
            self.ids.generate(),
            command.name,
            command.description,
            price,
            stock,
            command.image_url,
        )?;

        let mut uow = self.store.begin().await?;
        uow.save_product(&product);
        uow.commit().await?;

        self.metrics.products_created.inc();
        tracing::info!(
            product_id = %product.id(),
            name = %product.name(),
            price = %product.price(),
            stock = product.stock(),
            "Product created"
        );

        Ok(product.id())
    }

    pub async fn list_products(&self, query: ListProducts) -> Result<ProductPage, ShopError> {
        if query.page == 0 || query.limit == 0 || query.limit > MAX_PAGE_SIZE {
            return Err(ProductError::InvalidPagination {
                page: query.page,
                limit: query.limit,
            }
            .into());
        }
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let mut uow = self.store.begin().await?;
        let products = uow.search_products(search, query.page, query.limit).await;
        let total = uow.count_products(search).await;
        uow.rollback().await?;

        let products = products?;
        let total = total?;

        tracing::debug!(
            search = ?search,
            page = query.page,
            returned = products.len(),
            total,
            "Listed products"
        );

        Ok(ProductPage {
            data: products.iter().map(ProductSummary::from).collect(),
            meta: PageMeta::new(total, query.page, query.limit),
        })
    }
}
