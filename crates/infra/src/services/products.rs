use std::sync::Arc;

use tracing::{info, instrument};

use restaurant_core::{DomainError, Entity, ProductId};
use restaurant_products::{Product, ProductDraft};

use super::ServiceResult;
use crate::store::Store;

/// Product catalogue and stock levels.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn Store>,
}

impl ProductService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), err)]
    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        let mut uow = self.store.begin().await?;
        let products = uow.products().await?;
        uow.rollback().await?;
        Ok(products)
    }

    #[instrument(skip(self), err)]
    pub async fn get_product(&self, id: ProductId) -> ServiceResult<Option<Product>> {
        let mut uow = self.store.begin().await?;
        let product = uow.product(id).await?;
        uow.rollback().await?;
        Ok(product)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name), err)]
    pub async fn add_product(&self, draft: ProductDraft) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), draft)?;

        let mut uow = self.store.begin().await?;
        uow.save_product(&product).await?;
        uow.commit().await?;

        info!(product_id = %product.id_typed(), "product added");
        Ok(product)
    }

    /// Replace every writable field of an existing product.
    #[instrument(skip(self, draft), err)]
    pub async fn update_product(&self, id: ProductId, draft: ProductDraft) -> ServiceResult<Product> {
        draft.validate()?;

        let mut uow = self.store.begin().await?;
        let mut product = uow
            .product(id)
            .await?
            .ok_or_else(|| DomainError::not_found(Product::KIND, id))?;
        product.update(draft)?;
        uow.save_product(&product).await?;
        uow.commit().await?;

        info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Delete a product and drop it from every menu item that used it.
    /// Deleting an unknown id is a no-op.
    #[instrument(skip(self), err)]
    pub async fn delete_product(&self, id: ProductId) -> ServiceResult<()> {
        let mut uow = self.store.begin().await?;
        let removed = uow.delete_product(id).await?;
        uow.commit().await?;

        info!(product_id = %id, removed, "product delete");
        Ok(())
    }
}
