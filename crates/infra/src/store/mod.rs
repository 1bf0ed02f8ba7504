//! Storage abstraction: a [`Store`] hands out [`UnitOfWork`]s.
//!
//! Every service operation runs inside exactly one unit of work. Reads and
//! writes made through it are visible only to that unit of work until
//! [`UnitOfWork::commit`] publishes them all at once. Dropping a unit of work
//! without committing discards its changes, so an early `?` return is a
//! rollback.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` by [`map_sqlx_error`]:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed | N/A | `PoolClosed` |
//! | Other | N/A | `Database` |

use async_trait::async_trait;
use thiserror::Error;

use restaurant_core::{MenuItemId, OrderId, ProductId};
use restaurant_menu::MenuItem;
use restaurant_orders::Order;
use restaurant_products::Product;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure. Never carries a business rule violation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("constraint violated in {operation}: {message}")]
    Constraint { operation: String, message: String },

    #[error("connection pool closed in {operation}")]
    PoolClosed { operation: String },

    #[error("schema setup failed: {0}")]
    Schema(String),
}

/// Factory for units of work.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// One atomic batch of reads and writes.
///
/// Listing methods return rows ordered by id, which for UUIDv7 ids is
/// creation order.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn product(&mut self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Like [`product`](Self::product), but the row stays locked against
    /// concurrent writers until this unit of work ends.
    async fn product_for_update(&mut self, id: ProductId) -> StoreResult<Option<Product>>;

    async fn products(&mut self) -> StoreResult<Vec<Product>>;

    /// Insert or replace.
    async fn save_product(&mut self, product: &Product) -> StoreResult<()>;

    /// Remove a product and drop it from every menu item's bill-of-materials.
    /// Returns whether the product existed.
    async fn delete_product(&mut self, id: ProductId) -> StoreResult<bool>;

    async fn menu_item(&mut self, id: MenuItemId) -> StoreResult<Option<MenuItem>>;

    async fn menu_items(&mut self) -> StoreResult<Vec<MenuItem>>;

    async fn save_menu_item(&mut self, menu_item: &MenuItem) -> StoreResult<()>;

    /// Orders that reference the menu item keep their lines.
    async fn delete_menu_item(&mut self, id: MenuItemId) -> StoreResult<bool>;

    async fn order(&mut self, id: OrderId) -> StoreResult<Option<Order>>;

    async fn orders(&mut self) -> StoreResult<Vec<Order>>;

    async fn save_order(&mut self, order: &Order) -> StoreResult<()>;

    async fn delete_order(&mut self, id: OrderId) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                // unique, foreign key, check
                Some("23505") | Some("23503") | Some("23514") => StoreError::Constraint {
                    operation: operation.to_string(),
                    message,
                },
                _ => StoreError::Database {
                    operation: operation.to_string(),
                    message,
                },
            }
        }
        sqlx::Error::PoolClosed => StoreError::PoolClosed {
            operation: operation.to_string(),
        },
        other => StoreError::Database {
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}
