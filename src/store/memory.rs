use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::order::{Order, OrderRepository};
use crate::domain::product::{Product, ProductRepository};
use crate::domain::repository::{RepositoryError, Store, UnitOfWork};
use super::PendingWrite;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
}

impl Snapshot {
    fn apply(&mut self, write: PendingWrite) {
        match write {
            PendingWrite::SaveProduct(product) => {
                self.products.insert(product.id(), product);
            }
            PendingWrite::RemoveProduct(id) => {
                self.products.remove(&id);
            }
            PendingWrite::SaveOrder(order) => {
                self.orders.insert(order.id(), order);
            }
        }
    }

    fn matching_products(&self, search: Option<&str>) -> Vec<&Product> {
        let needle = search.map(str::to_lowercase);
        let mut products: Vec<&Product> = self
            .products
            .values()
            .filter(|p| p.is_active())
            .filter(|p| match &needle {
                None => true,
                Some(needle) => {
                    p.name().to_lowercase().contains(needle.as_str())
                        || p
                            .description()
                            .is_some_and(|d| d.to_lowercase().contains(needle.as_str()))
                }
            })
            .collect();

        // Newest first; ties broken by id so paging is stable
        products.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        products
    }
}

/// In-process store for tests and the demo binary.
///
/// A unit of work holds the store lock for its whole lifetime, so units of
/// work run one at a time. Writes land in a private copy and replace the
/// shared state only on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<Snapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product outside any unit of work.
    pub async fn seed_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.products.insert(product.id(), product);
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.state.lock().await.products.get(&id).cloned()
    }

    pub async fn order(&self, id: Uuid) -> Option<Order> {
        self.state.lock().await.orders.get(&id).cloned()
    }

    /// Returns whether the product existed.
    pub async fn delete_product(&self, id: Uuid) -> bool {
        self.state.lock().await.products.remove(&id).is_some()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            working,
            pending: Vec::new(),
        }))
    }
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Snapshot>,
    working: Snapshot,
    pending: Vec<PendingWrite>,
}

#[async_trait]
impl ProductRepository for InMemoryUnitOfWork {
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        // The whole store is already locked by this unit of work
        self.find_product(id).await
    }

    async fn search_products(
        &mut self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        Ok(self
            .working
            .matching_products(search)
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_products(&mut self, search: Option<&str>) -> Result<u64, RepositoryError> {
        Ok(self.working.matching_products(search).len() as u64)
    }

    fn save_product(&mut self, product: &Product) {
        self.pending.push(PendingWrite::SaveProduct(product.clone()));
    }

    fn remove_product(&mut self, id: Uuid) {
        self.pending.push(PendingWrite::RemoveProduct(id));
    }
}

#[async_trait]
impl OrderRepository for InMemoryUnitOfWork {
    async fn find_order(&mut self, id: Uuid, customer_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .working
            .orders
            .get(&id)
            .filter(|order| order.belongs_to_customer(customer_id))
            .cloned())
    }

    async fn find_order_for_update(
        &mut self,
        id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        self.find_order(id, customer_id).await
    }

    async fn find_orders_by_customer(&mut self, customer_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .working
            .orders
            .values()
            .filter(|order| order.belongs_to_customer(customer_id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(orders)
    }

    fn save_order(&mut self, order: &Order) {
        self.pending.push(PendingWrite::SaveOrder(order.clone()));
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn flush(&mut self) -> Result<(), RepositoryError> {
        for write in self.pending.drain(..) {
            self.working.apply(write);
        }
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), RepositoryError> {
        self.flush().await?;
        let this = *self;
        let mut guard = this.guard;
        *guard = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        // Dropping the guard releases the lock; the working copy is discarded
        Ok(())
    }
}
