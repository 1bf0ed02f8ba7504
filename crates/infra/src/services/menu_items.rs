use std::sync::Arc;

use tracing::{info, instrument};

use restaurant_core::{DomainError, Entity, MenuItemId};
use restaurant_menu::{MenuItem, MenuItemDraft};

use super::{ensure_products_exist, ServiceResult};
use crate::store::Store;

/// Dishes and their bills-of-materials.
#[derive(Clone)]
pub struct MenuItemService {
    store: Arc<dyn Store>,
}

impl MenuItemService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), err)]
    pub async fn list_menu_items(&self) -> ServiceResult<Vec<MenuItem>> {
        let mut uow = self.store.begin().await?;
        let menu_items = uow.menu_items().await?;
        uow.rollback().await?;
        Ok(menu_items)
    }

    #[instrument(skip(self), err)]
    pub async fn get_menu_item(&self, id: MenuItemId) -> ServiceResult<Option<MenuItem>> {
        let mut uow = self.store.begin().await?;
        let menu_item = uow.menu_item(id).await?;
        uow.rollback().await?;
        Ok(menu_item)
    }

    /// Every referenced product must exist when the menu item is written.
    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    pub async fn add_menu_item(&self, draft: MenuItemDraft) -> ServiceResult<MenuItem> {
        let menu_item = MenuItem::create(MenuItemId::new(), draft)?;

        let mut uow = self.store.begin().await?;
        ensure_products_exist(uow.as_mut(), menu_item.product_ids()).await?;
        uow.save_menu_item(&menu_item).await?;
        uow.commit().await?;

        info!(
            menu_item_id = %menu_item.id_typed(),
            products = menu_item.product_ids().len(),
            "menu item added"
        );
        Ok(menu_item)
    }

    #[instrument(skip(self, draft), err)]
    pub async fn update_menu_item(&self, id: MenuItemId, draft: MenuItemDraft) -> ServiceResult<MenuItem> {
        draft.validate()?;

        let mut uow = self.store.begin().await?;
        let mut menu_item = uow
            .menu_item(id)
            .await?
            .ok_or_else(|| DomainError::not_found(MenuItem::KIND, id))?;
        ensure_products_exist(uow.as_mut(), &draft.product_ids).await?;
        menu_item.update(draft)?;
        uow.save_menu_item(&menu_item).await?;
        uow.commit().await?;

        info!(menu_item_id = %id, "menu item updated");
        Ok(menu_item)
    }

    /// Past orders keep their lines. Deleting an unknown id is a no-op.
    #[instrument(skip(self), err)]
    pub async fn delete_menu_item(&self, id: MenuItemId) -> ServiceResult<()> {
        let mut uow = self.store.begin().await?;
        let removed = uow.delete_menu_item(id).await?;
        uow.commit().await?;

        info!(menu_item_id = %id, removed, "menu item delete");
        Ok(())
    }
}
