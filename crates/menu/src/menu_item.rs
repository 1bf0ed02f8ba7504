use serde::{Deserialize, Serialize};

use restaurant_core::validation::require_name;
use restaurant_core::{DomainError, DomainResult, Entity, MenuItemId, ProductId};

/// Writable menu item fields, as submitted on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemDraft {
    pub name: String,
    pub product_ids: Vec<ProductId>,
}

impl MenuItemDraft {
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        require_name("name", &self.name, &mut violations);
        DomainError::check(violations)
    }
}

/// Entity: MenuItem (a dish and the products it is made from).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    id: MenuItemId,
    name: String,
    product_ids: Vec<ProductId>,
}

impl MenuItem {
    /// Create a new menu item from validated input.
    ///
    /// Product existence is not checked here; that needs storage and is done
    /// by the caller inside the same unit of work as the write.
    pub fn create(id: MenuItemId, draft: MenuItemDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self::restore(id, draft.name, draft.product_ids))
    }

    /// Rebuild a menu item from storage.
    pub fn restore(id: MenuItemId, name: String, product_ids: Vec<ProductId>) -> Self {
        Self {
            id,
            name,
            product_ids: dedup_preserving_order(product_ids),
        }
    }

    /// Replace the name and the whole bill-of-materials.
    pub fn update(&mut self, draft: MenuItemDraft) -> DomainResult<()> {
        draft.validate()?;
        self.name = draft.name;
        self.product_ids = dedup_preserving_order(draft.product_ids);
        Ok(())
    }

    pub fn id_typed(&self) -> MenuItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bill-of-materials. Each product appears once.
    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    pub fn uses_product(&self, product_id: ProductId) -> bool {
        self.product_ids.contains(&product_id)
    }

    /// Drop a product from the bill-of-materials (after the product was deleted).
    /// Returns whether anything changed.
    pub fn remove_product(&mut self, product_id: ProductId) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|p| *p != product_id);
        self.product_ids.len() != before
    }
}

impl Entity for MenuItem {
    type Id = MenuItemId;

    const KIND: &'static str = "menu item";

    fn id(&self) -> MenuItemId {
        self.id
    }
}

// The bill-of-materials is a set; keep the first occurrence of each product.
fn dedup_preserving_order(ids: Vec<ProductId>) -> Vec<ProductId> {
    let mut out: Vec<ProductId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
