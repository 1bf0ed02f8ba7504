//! Postgres-backed store.
//!
//! Each unit of work is one database transaction. Menu item bills-of-materials
//! and order lines live in child tables keyed by a `position` column so the
//! list order survives a round trip.
//!
//! ## Referential behavior
//!
//! - `menu_item_products.product_id` cascades on product delete, which is how a
//!   deleted product disappears from every bill-of-materials.
//! - `order_lines.menu_item_id` has no foreign key: orders keep the ids of
//!   menu items deleted after placement.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use restaurant_core::{MenuItemId, OrderId, ProductId};
use restaurant_menu::MenuItem;
use restaurant_orders::Order;
use restaurant_products::{Product, ProductDraft};

use super::{map_sqlx_error, Store, StoreError, StoreResult, UnitOfWork};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        portion_count NUMERIC NOT NULL CHECK (portion_count >= 0),
        unit TEXT NOT NULL,
        portion_size NUMERIC NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS menu_items (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS menu_item_products (
        menu_item_id UUID NOT NULL REFERENCES menu_items (id) ON DELETE CASCADE,
        product_id UUID NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        PRIMARY KEY (menu_item_id, product_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        date_time TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_lines (
        order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        menu_item_id UUID NOT NULL,
        PRIMARY KEY (order_id, position)
    )
    "#,
];

/// Postgres-backed store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; clones share the pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a connection pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create any missing tables. Existing tables are left alone.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| StoreError::Schema(e.to_string()))?;
        }
        debug!(tables = SCHEMA.len(), "schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl PostgresUnitOfWork {
    async fn load_product(&mut self, id: ProductId, lock: bool) -> StoreResult<Option<Product>> {
        let sql = if lock {
            "SELECT id, name, portion_count, unit, portion_size FROM products WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT id, name, portion_count, unit, portion_size FROM products WHERE id = $1"
        };
        let row = sqlx::query(sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("load_product", e))?;
        row.map(|r| product_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("load_product", e))
    }

    async fn bill_of_materials(&mut self, id: MenuItemId) -> StoreResult<Vec<ProductId>> {
        let rows = sqlx::query(
            "SELECT product_id FROM menu_item_products WHERE menu_item_id = $1 ORDER BY position",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_bill_of_materials", e))?;
        rows.iter()
            .map(|r| r.try_get::<Uuid, _>("product_id").map(ProductId::from_uuid))
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("load_bill_of_materials", e))
    }

    async fn order_lines(&mut self, id: OrderId) -> StoreResult<Vec<MenuItemId>> {
        let rows = sqlx::query(
            "SELECT menu_item_id FROM order_lines WHERE order_id = $1 ORDER BY position",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_order_lines", e))?;
        rows.iter()
            .map(|r| r.try_get::<Uuid, _>("menu_item_id").map(MenuItemId::from_uuid))
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("load_order_lines", e))
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    #[instrument(skip(self), err)]
    async fn product(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        self.load_product(id, false).await
    }

    #[instrument(skip(self), err)]
    async fn product_for_update(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        self.load_product(id, true).await
    }

    #[instrument(skip(self), err)]
    async fn products(&mut self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, portion_count, unit, portion_size FROM products ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter()
            .map(product_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_products", e))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn save_product(&mut self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, portion_count, unit, portion_size)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                portion_count = EXCLUDED.portion_count,
                unit = EXCLUDED.unit,
                portion_size = EXCLUDED.portion_size
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.portion_count())
        .bind(product.unit())
        .bind(product.portion_size())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save_product", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_product(&mut self, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn menu_item(&mut self, id: MenuItemId) -> StoreResult<Option<MenuItem>> {
        let row = sqlx::query("SELECT name FROM menu_items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("load_menu_item", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let name: String = row
            .try_get("name")
            .map_err(|e| map_sqlx_error("load_menu_item", e))?;
        let product_ids = self.bill_of_materials(id).await?;
        Ok(Some(MenuItem::restore(id, name, product_ids)))
    }

    #[instrument(skip(self), err)]
    async fn menu_items(&mut self) -> StoreResult<Vec<MenuItem>> {
        let rows = sqlx::query("SELECT id, name FROM menu_items ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("list_menu_items", e))?;
        let links = sqlx::query(
            "SELECT menu_item_id, product_id FROM menu_item_products ORDER BY menu_item_id, position",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_menu_items", e))?;

        let mut bills: HashMap<Uuid, Vec<ProductId>> = HashMap::new();
        for link in &links {
            let menu_item_id: Uuid = link
                .try_get("menu_item_id")
                .map_err(|e| map_sqlx_error("list_menu_items", e))?;
            let product_id: Uuid = link
                .try_get("product_id")
                .map_err(|e| map_sqlx_error("list_menu_items", e))?;
            bills
                .entry(menu_item_id)
                .or_default()
                .push(ProductId::from_uuid(product_id));
        }

        let mut menu_items = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = row
                .try_get("id")
                .map_err(|e| map_sqlx_error("list_menu_items", e))?;
            let name: String = row
                .try_get("name")
                .map_err(|e| map_sqlx_error("list_menu_items", e))?;
            let product_ids = bills.remove(&id).unwrap_or_default();
            menu_items.push(MenuItem::restore(MenuItemId::from_uuid(id), name, product_ids));
        }
        Ok(menu_items)
    }

    #[instrument(skip(self, menu_item), fields(menu_item_id = %menu_item.id_typed()), err)]
    async fn save_menu_item(&mut self, menu_item: &MenuItem) -> StoreResult<()> {
        let id = menu_item.id_typed();
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id)
            DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(id.as_uuid())
        .bind(menu_item.name())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save_menu_item", e))?;

        sqlx::query("DELETE FROM menu_item_products WHERE menu_item_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("save_menu_item", e))?;

        for (position, product_id) in menu_item.product_ids().iter().enumerate() {
            sqlx::query(
                "INSERT INTO menu_item_products (menu_item_id, product_id, position) VALUES ($1, $2, $3)",
            )
            .bind(id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(position as i32)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("save_menu_item", e))?;
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_menu_item(&mut self, id: MenuItemId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_menu_item", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn order(&mut self, id: OrderId) -> StoreResult<Option<Order>> {
        let row = sqlx::query("SELECT date_time FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("load_order", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let date_time: DateTime<Utc> = row
            .try_get("date_time")
            .map_err(|e| map_sqlx_error("load_order", e))?;
        let lines = self.order_lines(id).await?;
        Ok(Some(Order::restore(id, date_time, lines)))
    }

    #[instrument(skip(self), err)]
    async fn orders(&mut self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query("SELECT id, date_time FROM orders ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("list_orders", e))?;
        let line_rows = sqlx::query(
            "SELECT order_id, menu_item_id FROM order_lines ORDER BY order_id, position",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let mut lines: HashMap<Uuid, Vec<MenuItemId>> = HashMap::new();
        for line in &line_rows {
            let order_id: Uuid = line
                .try_get("order_id")
                .map_err(|e| map_sqlx_error("list_orders", e))?;
            let menu_item_id: Uuid = line
                .try_get("menu_item_id")
                .map_err(|e| map_sqlx_error("list_orders", e))?;
            lines
                .entry(order_id)
                .or_default()
                .push(MenuItemId::from_uuid(menu_item_id));
        }

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = row
                .try_get("id")
                .map_err(|e| map_sqlx_error("list_orders", e))?;
            let date_time: DateTime<Utc> = row
                .try_get("date_time")
                .map_err(|e| map_sqlx_error("list_orders", e))?;
            let menu_item_ids = lines.remove(&id).unwrap_or_default();
            orders.push(Order::restore(OrderId::from_uuid(id), date_time, menu_item_ids));
        }
        Ok(orders)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id_typed()), err)]
    async fn save_order(&mut self, order: &Order) -> StoreResult<()> {
        let id = order.id_typed();
        sqlx::query(
            r#"
            INSERT INTO orders (id, date_time)
            VALUES ($1, $2)
            ON CONFLICT (id)
            DO UPDATE SET date_time = EXCLUDED.date_time
            "#,
        )
        .bind(id.as_uuid())
        .bind(order.date_time())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save_order", e))?;

        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("save_order", e))?;

        for (position, menu_item_id) in order.menu_item_ids().iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_lines (order_id, position, menu_item_id) VALUES ($1, $2, $3)",
            )
            .bind(id.as_uuid())
            .bind(position as i32)
            .bind(menu_item_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("save_order", e))?;
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_order(&mut self, id: OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let portion_count: Decimal = row.try_get("portion_count")?;
    let portion_size: Decimal = row.try_get("portion_size")?;
    Ok(Product::restore(
        ProductId::from_uuid(id),
        ProductDraft {
            name: row.try_get("name")?,
            portion_count,
            unit: row.try_get("unit")?,
            portion_size,
        },
    ))
}
