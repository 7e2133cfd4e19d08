use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::repository::RepositoryError;
use super::aggregate::Product;

#[async_trait]
pub trait ProductRepository: Send {
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, RepositoryError>;

    /// Like `find_product`, but locks the row until the unit of work ends.
    async fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, RepositoryError>;

    /// Active products, newest first. `search` matches name or description,
    /// case-insensitively. `page` starts at 1.
    async fn search_products(
        &mut self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError>;

    async fn count_products(&mut self, search: Option<&str>) -> Result<u64, RepositoryError>;

    fn save_product(&mut self, product: &Product);

    fn remove_product(&mut self, id: Uuid);
}
