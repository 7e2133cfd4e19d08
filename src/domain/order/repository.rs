use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::repository::RepositoryError;
use super::aggregate::Order;

/// Every lookup is scoped by the owning customer, so an order belonging to
/// someone else is indistinguishable from a missing one.
#[async_trait]
pub trait OrderRepository: Send {
    async fn find_order(&mut self, id: Uuid, customer_id: Uuid) -> Result<Option<Order>, RepositoryError>;

    /// Like `find_order`, but locks the row until the unit of work ends.
    async fn find_order_for_update(
        &mut self,
        id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Newest first.
    async fn find_orders_by_customer(&mut self, customer_id: Uuid) -> Result<Vec<Order>, RepositoryError>;

    fn save_order(&mut self, order: &Order);
}
