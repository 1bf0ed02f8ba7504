//! Infrastructure layer: storage backends and the application services built on them.

pub mod services;
pub mod store;

mod integration_tests;

pub use services::{MenuItemService, OrderService, ProductService, ServiceError, ServiceResult};
pub use store::{InMemoryStore, PostgresStore, Store, StoreError, StoreResult, UnitOfWork};
