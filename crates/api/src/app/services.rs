use std::sync::Arc;

use restaurant_infra::{
    InMemoryStore, MenuItemService, OrderService, PostgresStore, ProductService, Store, StoreError,
};

use crate::config::StorageConfig;

/// Application services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub menu_items: MenuItemService,
    pub orders: OrderService,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            menu_items: MenuItemService::new(store.clone()),
            orders: OrderService::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

/// Wire the services to the configured backend.
pub async fn build_services(storage: &StorageConfig) -> Result<AppServices, StoreError> {
    match storage {
        StorageConfig::InMemory => {
            tracing::info!("using in-memory store");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresStore::connect(database_url, *max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(max_connections, "using postgres store");
            Ok(AppServices::new(Arc::new(store)))
        }
    }
}
