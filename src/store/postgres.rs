use std::collections::HashMap;
use std::fmt::Display;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::money::{Currency, Money};
use crate::domain::order::{Order, OrderItem, OrderRecord, OrderRepository, OrderStatus};
use crate::domain::product::{Product, ProductRecord, ProductRepository};
use crate::domain::repository::{RepositoryError, Store, UnitOfWork};
use super::PendingWrite;

// ============================================================================
// PostgreSQL Store
// ============================================================================
//
// One unit of work = one transaction (READ COMMITTED). `*_for_update`
// lookups take row locks that are held until commit or rollback.
//
// ============================================================================

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork {
            tx,
            pending: Vec::new(),
        }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
    pending: Vec<PendingWrite>,
}

// ============================================================================
// Row Mapping
// ============================================================================

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    currency: String,
    stock: i32,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let currency = Currency::new(&self.currency).map_err(corrupt)?;
        let price = Money::new(self.price, currency).map_err(corrupt)?;

        Product::restore(ProductRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            price,
            stock: i64::from(self.stock),
            image_url: self.image_url,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
        .map_err(corrupt)
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    status: String,
    currency: String,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl OrderRow {
    fn into_order(self, item_rows: Vec<OrderItemRow>) -> Result<Order, RepositoryError> {
        let currency = Currency::new(&self.currency).map_err(corrupt)?;
        let status = self.status.parse::<OrderStatus>().map_err(corrupt)?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            let quantity = u32::try_from(row.quantity).map_err(corrupt)?;
            let unit_price = Money::new(row.unit_price, currency.clone()).map_err(corrupt)?;
            let item = OrderItem::new(row.id, row.order_id, row.product_id, row.product_name, unit_price, quantity)
                .map_err(corrupt)?;
            items.push(item);
        }

        let record = OrderRecord {
            id: self.id,
            customer_id: self.customer_id,
            status,
            currency,
            created_at: self.created_at,
            paid_at: self.paid_at,
        };
        Order::restore(record, items).map_err(corrupt)
    }
}

fn corrupt(err: impl Display) -> RepositoryError {
    RepositoryError::Corrupt(err.to_string())
}

/// `%term%` pattern for ILIKE with the wildcard characters escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, currency, stock, image_url, active, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, customer_id, status, currency, created_at, paid_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, unit_price, quantity";

impl PgUnitOfWork {
    async fn fetch_product(&mut self, id: Uuid, lock: bool) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1{}",
            if lock { " FOR UPDATE" } else { "" }
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn fetch_order(
        &mut self,
        id: Uuid,
        customer_id: Uuid,
        lock: bool,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND customer_id = $2{}",
            if lock { " FOR UPDATE" } else { "" }
        );
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(customer_id)
            .fetch_optional(&mut *self.tx)
            .await?
        else {
            return Ok(None);
        };

        let mut items = self.fetch_items(&[row.id]).await?;
        let item_rows = items.remove(&row.id).unwrap_or_default();
        row.into_order(item_rows).map(Some)
    }

    async fn fetch_items(&mut self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItemRow>>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position"
        );
        let rows = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(order_ids)
            .fetch_all(&mut *self.tx)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn write_product(&mut self, product: &Product) -> Result<(), RepositoryError> {
        let stock = i32::try_from(product.stock()).map_err(corrupt)?;

        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, currency, stock, image_url, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                currency = EXCLUDED.currency,
                stock = EXCLUDED.stock,
                image_url = EXCLUDED.image_url,
                active = EXCLUDED.active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price().amount())
        .bind(product.price().currency().as_str())
        .bind(stock)
        .bind(product.image_url())
        .bind(product.is_active())
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn write_order(&mut self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, total, currency, created_at, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                total = EXCLUDED.total,
                paid_at = EXCLUDED.paid_at
            "#,
        )
        .bind(order.id())
        .bind(order.customer_id())
        .bind(order.status().as_str())
        .bind(order.total().amount())
        .bind(order.currency().as_str())
        .bind(order.created_at())
        .bind(order.paid_at())
        .execute(&mut *self.tx)
        .await?;

        // Items never change once written
        for (position, item) in order.items().iter().enumerate() {
            let position = i32::try_from(position).map_err(corrupt)?;
            let quantity = i32::try_from(item.quantity()).map_err(corrupt)?;

            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, product_id, product_name, unit_price, quantity, subtotal, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(item.id())
            .bind(item.order_id())
            .bind(item.product_id())
            .bind(item.product_name())
            .bind(item.unit_price().amount())
            .bind(quantity)
            .bind(item.subtotal().amount())
            .bind(position)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PgUnitOfWork {
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        self.fetch_product(id, false).await
    }

    async fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        self.fetch_product(id, true).await
    }

    async fn search_products(
        &mut self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE active = TRUE
              AND ($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(search.map(like_pattern))
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&mut *self.tx)
            .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn count_products(&mut self, search: Option<&str>) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM products
            WHERE active = TRUE
              AND ($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1)
            "#,
        )
        .bind(search.map(like_pattern))
        .fetch_one(&mut *self.tx)
        .await?;

        u64::try_from(count).map_err(corrupt)
    }

    fn save_product(&mut self, product: &Product) {
        self.pending.push(PendingWrite::SaveProduct(product.clone()));
    }

    fn remove_product(&mut self, id: Uuid) {
        self.pending.push(PendingWrite::RemoveProduct(id));
    }
}

#[async_trait]
impl OrderRepository for PgUnitOfWork {
    async fn find_order(&mut self, id: Uuid, customer_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        self.fetch_order(id, customer_id, false).await
    }

    async fn find_order_for_update(
        &mut self,
        id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        self.fetch_order(id, customer_id, true).await
    }

    async fn find_orders_by_customer(&mut self, customer_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(customer_id)
            .fetch_all(&mut *self.tx)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut items = self.fetch_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let item_rows = items.remove(&row.id).unwrap_or_default();
                row.into_order(item_rows)
            })
            .collect()
    }

    fn save_order(&mut self, order: &Order) {
        self.pending.push(PendingWrite::SaveOrder(order.clone()));
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn flush(&mut self) -> Result<(), RepositoryError> {
        for write in std::mem::take(&mut self.pending) {
            match write {
                PendingWrite::SaveProduct(product) => self.write_product(&product).await?,
                PendingWrite::RemoveProduct(id) => {
                    sqlx::query("DELETE FROM products WHERE id = $1")
                        .bind(id)
                        .execute(&mut *self.tx)
                        .await?;
                }
                PendingWrite::SaveOrder(order) => self.write_order(&order).await?,
            }
        }
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), RepositoryError> {
        self.flush().await?;
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("lamp"), "%lamp%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
