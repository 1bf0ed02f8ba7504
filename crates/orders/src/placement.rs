//! Stock reconciliation for order placement.
//!
//! Placing an order consumes one portion of every product in the
//! bill-of-materials of every ordered menu item, once per line. The
//! [`StockLedger`] holds working copies of the products an order touches and
//! applies those deductions in memory:
//!
//! ```text
//! for line in order.menu_item_ids          (list order, duplicates counted)
//!   for product in menu_item.product_ids
//!     require product.portion_count >= 1   (else Conflict, whole order aborts)
//!     product.portion_count -= 1
//! ```
//!
//! Because deductions accumulate in the ledger, a product shared by two lines
//! (or a dish ordered twice) is checked against the already-reduced count.
//! Nothing is written until the caller persists `into_products()` together
//! with the order, in one unit of work.

use std::collections::HashMap;

use restaurant_core::{DomainError, DomainResult, Entity, ProductId};
use restaurant_menu::MenuItem;
use restaurant_products::Product;

#[derive(Debug, Default)]
pub struct StockLedger {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a product loaded from storage.
    ///
    /// A product that is already tracked keeps its working copy, which may
    /// already carry deductions from earlier lines.
    pub fn track(&mut self, product: Product) {
        let id = product.id_typed();
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id, self.products.len());
        self.products.push(product);
    }

    /// Current working copy of a tracked product.
    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.index.get(&product_id).map(|i| &self.products[*i])
    }

    /// Consume one portion of every product in the menu item's bill-of-materials.
    ///
    /// Fails with `NotFound("product", id)` for a product that was never
    /// tracked (it no longer exists), or `Conflict("insufficient stock", name)`
    /// on the first product with less than one portion left.
    pub fn consume_for(&mut self, menu_item: &MenuItem) -> DomainResult<()> {
        for product_id in menu_item.product_ids() {
            let slot = *self
                .index
                .get(product_id)
                .ok_or_else(|| DomainError::not_found(Product::KIND, product_id))?;
            self.products[slot].consume_portion()?;
        }
        Ok(())
    }

    /// Every tracked product, with its deductions applied, in first-touched order.
    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restaurant_core::MenuItemId;
    use restaurant_menu::MenuItemDraft;
    use restaurant_products::ProductDraft;
    use rust_decimal::Decimal;

    fn product(name: &str, portions: i64) -> Product {
        Product::restore(
            ProductId::new(),
            ProductDraft {
                name: name.to_string(),
                portion_count: Decimal::from(portions),
                unit: "units".to_string(),
                portion_size: Decimal::ONE,
            },
        )
    }

    fn dish(name: &str, products: &[&Product]) -> MenuItem {
        MenuItem::create(
            MenuItemId::new(),
            MenuItemDraft {
                name: name.to_string(),
                product_ids: products.iter().map(|p| p.id_typed()).collect(),
            },
        )
        .unwrap()
    }

    #[test]
    fn single_line_consumes_one_portion_per_product() {
        let p = product("Potato", 5);
        let m = dish("Fries", &[&p]);
        let mut ledger = StockLedger::new();
        ledger.track(p.clone());

        ledger.consume_for(&m).unwrap();

        assert_eq!(ledger.product(p.id_typed()).unwrap().portion_count(), Decimal::from(4));
    }

    #[test]
    fn repeated_line_fails_when_cumulative_demand_exceeds_stock() {
        let p = product("Potato", 1);
        let m = dish("Fries", &[&p]);
        let mut ledger = StockLedger::new();
        ledger.track(p.clone());

        ledger.consume_for(&m).unwrap();
        let err = ledger.consume_for(&m).unwrap_err();

        assert_eq!(err, DomainError::conflict("insufficient stock", "Potato"));
    }

    #[test]
    fn shared_product_is_counted_across_dishes() {
        let cheese = product("Cheese", 2);
        let bun = product("Bun", 5);
        let burger = dish("Cheeseburger", &[&bun, &cheese]);
        let nachos = dish("Nachos", &[&cheese]);
        let mut ledger = StockLedger::new();
        ledger.track(cheese.clone());
        ledger.track(bun.clone());

        ledger.consume_for(&burger).unwrap();
        ledger.consume_for(&nachos).unwrap();

        assert_eq!(ledger.product(cheese.id_typed()).unwrap().portion_count(), Decimal::ZERO);
        assert_eq!(ledger.product(bun.id_typed()).unwrap().portion_count(), Decimal::from(4));
        assert!(ledger.consume_for(&nachos).is_err());
    }

    #[test]
    fn tracking_twice_keeps_existing_deductions() {
        let p = product("Egg", 3);
        let m = dish("Omelette", &[&p]);
        let mut ledger = StockLedger::new();
        ledger.track(p.clone());
        ledger.consume_for(&m).unwrap();

        ledger.track(p.clone());

        assert_eq!(ledger.product(p.id_typed()).unwrap().portion_count(), Decimal::from(2));
        assert_eq!(ledger.into_products().len(), 1);
    }

    #[test]
    fn untracked_product_is_reported_missing() {
        let p = product("Truffle", 3);
        let m = dish("Risotto", &[&p]);
        let mut ledger = StockLedger::new();

        assert!(ledger.product(p.id_typed()).is_none());
        let err = ledger.consume_for(&m).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "product", .. }));
    }

    #[test]
    fn dish_without_products_consumes_nothing() {
        let water = dish("Water", &[]);
        let mut ledger = StockLedger::new();
        ledger.consume_for(&water).unwrap();
        assert!(ledger.into_products().is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: when an order succeeds, each product loses exactly the
            /// number of lines whose dish uses it; when it fails, some product's
            /// demand exceeded its stock.
            #[test]
            fn deductions_match_demand(
                stocks in proptest::collection::vec(0i64..6, 1..4),
                lines in proptest::collection::vec(0usize..3, 0..10),
            ) {
                let products: Vec<Product> = stocks
                    .iter()
                    .enumerate()
                    .map(|(i, s)| product(&"P".repeat(i + 1), *s))
                    .collect();
                // Dish k uses every product with index <= k (clamped).
                let dishes: Vec<MenuItem> = (0..3)
                    .map(|k| {
                        let used: Vec<&Product> = products.iter().take((k + 1).min(products.len())).collect();
                        dish("Dish", &used)
                    })
                    .collect();

                let mut ledger = StockLedger::new();
                for p in &products {
                    ledger.track(p.clone());
                }
                let outcome: DomainResult<()> = lines.iter().try_for_each(|k| ledger.consume_for(&dishes[*k]));

                let demand: Vec<i64> = products
                    .iter()
                    .map(|p| lines.iter().filter(|k| dishes[**k].uses_product(p.id_typed())).count() as i64)
                    .collect();
                let feasible = demand.iter().zip(&stocks).all(|(d, s)| d <= s);

                prop_assert_eq!(outcome.is_ok(), feasible);
                if feasible {
                    for ((p, d), s) in products.iter().zip(&demand).zip(&stocks) {
                        let left = ledger.product(p.id_typed()).unwrap().portion_count();
                        prop_assert_eq!(left, Decimal::from(s - d));
                    }
                }
            }
        }
    }
}
