//! Application services: one unit of work per operation.

use std::collections::BTreeSet;

use thiserror::Error;

use restaurant_core::{DomainError, Entity, ProductId};
use restaurant_products::Product;

use crate::store::{StoreError, UnitOfWork};

pub mod menu_items;
pub mod orders;
pub mod products;

pub use menu_items::MenuItemService;
pub use orders::OrderService;
pub use products::ProductService;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lock every referenced product for the rest of the unit of work.
///
/// Locks are taken in id order. Fails with `NotFound("product", id)` on the
/// first id in `product_ids` that does not exist.
pub(crate) async fn ensure_products_exist(
    uow: &mut dyn UnitOfWork,
    product_ids: &[ProductId],
) -> ServiceResult<()> {
    let distinct: BTreeSet<ProductId> = product_ids.iter().copied().collect();
    let mut found = BTreeSet::new();
    for product_id in distinct {
        if uow.product_for_update(product_id).await?.is_some() {
            found.insert(product_id);
        }
    }
    match product_ids.iter().find(|id| !found.contains(*id)) {
        Some(missing) => Err(DomainError::not_found(Product::KIND, missing).into()),
        None => Ok(()),
    }
}
