//! Order placement and maintenance.
//!
//! Placement runs in one unit of work:
//!
//! 1. load every distinct menu item on the order that exists;
//! 2. load every product those menu items use, locked, in id order;
//! 3. walk the lines in order through a [`StockLedger`], failing on the first
//!    line with an unknown menu item (`NotFound("menu item")`), an unknown
//!    product (`NotFound("product")`) or a product out of stock
//!    (`Conflict("insufficient stock")`);
//! 4. write the decremented products and the order, then commit.
//!
//! Any failure drops the unit of work, so stock is only ever changed together
//! with the insertion of the order that consumed it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use restaurant_core::{DomainError, Entity, MenuItemId, OrderId, ProductId};
use restaurant_menu::MenuItem;
use restaurant_orders::{Order, OrderDraft, StockLedger};

use super::ServiceResult;
use crate::store::{Store, UnitOfWork};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Place an order, consuming one portion of each product of each ordered
    /// menu item, once per line.
    #[instrument(skip(self, draft), err)]
    pub async fn place_order(&self, draft: OrderDraft) -> ServiceResult<Order> {
        let order = Order::place(OrderId::new(), draft)?;

        match self.reserve_and_insert(&order).await {
            Ok(()) => {
                info!(
                    order_id = %order.id_typed(),
                    lines = order.menu_item_ids().len(),
                    "order placed"
                );
                Ok(order)
            }
            Err(err) => {
                warn!(order_id = %order.id_typed(), error = %err, "order rejected");
                Err(err)
            }
        }
    }

    async fn reserve_and_insert(&self, order: &Order) -> ServiceResult<()> {
        let mut uow = self.store.begin().await?;

        let menu_items = load_menu_items(uow.as_mut(), order.menu_item_ids()).await?;

        let product_ids: BTreeSet<ProductId> = menu_items
            .values()
            .flat_map(|m| m.product_ids().iter().copied())
            .collect();
        let mut ledger = StockLedger::new();
        for product_id in product_ids {
            // A product missing here is reported by the ledger for the line that needs it.
            if let Some(product) = uow.product_for_update(product_id).await? {
                ledger.track(product);
            }
        }

        for menu_item_id in order.menu_item_ids() {
            let menu_item = menu_items
                .get(menu_item_id)
                .ok_or_else(|| DomainError::not_found(MenuItem::KIND, menu_item_id))?;
            ledger.consume_for(menu_item)?;
        }

        for product in ledger.into_products() {
            uow.save_product(&product).await?;
        }
        uow.save_order(order).await?;
        uow.commit().await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn get_order(&self, id: OrderId) -> ServiceResult<Option<Order>> {
        let mut uow = self.store.begin().await?;
        let order = uow.order(id).await?;
        uow.rollback().await?;
        Ok(order)
    }

    #[instrument(skip(self), err)]
    pub async fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        let mut uow = self.store.begin().await?;
        let orders = uow.orders().await?;
        uow.rollback().await?;
        Ok(orders)
    }

    /// Replace the timestamp and lines of an existing order.
    ///
    /// Stock is not touched: the portions consumed at placement depended on
    /// bills-of-materials that may have changed since.
    #[instrument(skip(self, draft), err)]
    pub async fn update_order(&self, id: OrderId, draft: OrderDraft) -> ServiceResult<Order> {
        draft.validate()?;

        let mut uow = self.store.begin().await?;
        let mut order = uow
            .order(id)
            .await?
            .ok_or_else(|| DomainError::not_found(Order::KIND, id))?;
        if let Some(menu_item_ids) = &draft.menu_item_ids {
            let known = load_menu_items(uow.as_mut(), menu_item_ids).await?;
            if let Some(missing) = menu_item_ids.iter().find(|id| !known.contains_key(*id)) {
                return Err(DomainError::not_found(MenuItem::KIND, missing).into());
            }
        }
        order.replace(draft)?;
        uow.save_order(&order).await?;
        uow.commit().await?;

        info!(order_id = %id, lines = order.menu_item_ids().len(), "order updated");
        Ok(order)
    }

    /// Stock consumed by the order is not restored. Deleting an unknown id is a no-op.
    #[instrument(skip(self), err)]
    pub async fn delete_order(&self, id: OrderId) -> ServiceResult<()> {
        let mut uow = self.store.begin().await?;
        let removed = uow.delete_order(id).await?;
        uow.commit().await?;

        info!(order_id = %id, removed, "order delete");
        Ok(())
    }
}

/// Load each distinct menu item once. Unknown ids are left out of the map.
async fn load_menu_items(
    uow: &mut dyn UnitOfWork,
    menu_item_ids: &[MenuItemId],
) -> ServiceResult<BTreeMap<MenuItemId, MenuItem>> {
    let distinct: BTreeSet<MenuItemId> = menu_item_ids.iter().copied().collect();
    let mut menu_items = BTreeMap::new();
    for menu_item_id in distinct {
        if let Some(menu_item) = uow.menu_item(menu_item_id).await? {
            menu_items.insert(menu_item_id, menu_item);
        }
    }
    Ok(menu_items)
}
