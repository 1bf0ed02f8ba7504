use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use restaurant_core::{MenuItemId, OrderId, ProductId};
use restaurant_menu::MenuItem;
use restaurant_orders::Order;
use restaurant_products::Product;

use super::{Store, StoreResult, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    menu_items: BTreeMap<MenuItemId, MenuItem>,
    orders: BTreeMap<OrderId, Order>,
}

/// In-memory store.
///
/// Intended for tests/dev. Units of work are serialized: each one holds the
/// table lock from `begin` until it is committed or dropped. Reads go to the
/// shared tables; the first write takes a private copy, which replaces the
/// shared tables on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork::open(&self.tables).await))
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Option<Tables>,
}

impl InMemoryUnitOfWork {
    async fn open(tables: &Arc<Mutex<Tables>>) -> Self {
        let guard = tables.clone().lock_owned().await;
        Self { guard, working: None }
    }

    fn read(&self) -> &Tables {
        self.working.as_ref().unwrap_or(&*self.guard)
    }

    fn write(&mut self) -> &mut Tables {
        let Self { guard, working } = self;
        working.get_or_insert_with(|| (**guard).clone())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn product(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.read().products.get(&id).cloned())
    }

    async fn product_for_update(&mut self, id: ProductId) -> StoreResult<Option<Product>> {
        // The whole store is already locked.
        self.product(id).await
    }

    async fn products(&mut self) -> StoreResult<Vec<Product>> {
        Ok(self.read().products.values().cloned().collect())
    }

    async fn save_product(&mut self, product: &Product) -> StoreResult<()> {
        self.write().products.insert(product.id_typed(), product.clone());
        Ok(())
    }

    async fn delete_product(&mut self, id: ProductId) -> StoreResult<bool> {
        if !self.read().products.contains_key(&id) {
            return Ok(false);
        }
        let tables = self.write();
        tables.products.remove(&id);
        for menu_item in tables.menu_items.values_mut() {
            menu_item.remove_product(id);
        }
        Ok(true)
    }

    async fn menu_item(&mut self, id: MenuItemId) -> StoreResult<Option<MenuItem>> {
        Ok(self.read().menu_items.get(&id).cloned())
    }

    async fn menu_items(&mut self) -> StoreResult<Vec<MenuItem>> {
        Ok(self.read().menu_items.values().cloned().collect())
    }

    async fn save_menu_item(&mut self, menu_item: &MenuItem) -> StoreResult<()> {
        self.write()
            .menu_items
            .insert(menu_item.id_typed(), menu_item.clone());
        Ok(())
    }

    async fn delete_menu_item(&mut self, id: MenuItemId) -> StoreResult<bool> {
        if !self.read().menu_items.contains_key(&id) {
            return Ok(false);
        }
        Ok(self.write().menu_items.remove(&id).is_some())
    }

    async fn order(&mut self, id: OrderId) -> StoreResult<Option<Order>> {
        Ok(self.read().orders.get(&id).cloned())
    }

    async fn orders(&mut self) -> StoreResult<Vec<Order>> {
        Ok(self.read().orders.values().cloned().collect())
    }

    async fn save_order(&mut self, order: &Order) -> StoreResult<()> {
        self.write().orders.insert(order.id_typed(), order.clone());
        Ok(())
    }

    async fn delete_order(&mut self, id: OrderId) -> StoreResult<bool> {
        if !self.read().orders.contains_key(&id) {
            return Ok(false);
        }
        Ok(self.write().orders.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        if let Some(working) = working {
            *guard = working;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
