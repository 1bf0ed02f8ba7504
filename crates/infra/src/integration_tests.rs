//! Integration tests for the service layer over the in-memory store.
//!
//! Tests: Service → UnitOfWork → Store
//!
//! Verifies:
//! - Order placement decrements stock once per line and product
//! - Rejected orders leave every product untouched
//! - Deletes are no-ops for unknown ids and cascade out of bills-of-materials

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use restaurant_core::{DomainError, MenuItemId, OrderId, ProductId};
    use restaurant_menu::{MenuItem, MenuItemDraft};
    use restaurant_orders::OrderDraft;
    use restaurant_products::{Product, ProductDraft};

    use crate::services::{MenuItemService, OrderService, ProductService, ServiceError};
    use crate::store::{InMemoryStore, Store};

    struct Kitchen {
        products: ProductService,
        menu_items: MenuItemService,
        orders: OrderService,
    }

    fn setup() -> Kitchen {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        Kitchen {
            products: ProductService::new(store.clone()),
            menu_items: MenuItemService::new(store.clone()),
            orders: OrderService::new(store),
        }
    }

    fn dinner_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 19, 30, 0).unwrap()
    }

    fn order_of(menu_item_ids: Vec<MenuItemId>) -> OrderDraft {
        OrderDraft {
            date_time: Some(dinner_time()),
            menu_item_ids: Some(menu_item_ids),
        }
    }

    async fn stock(k: &Kitchen, name: &str, portions: i64) -> Product {
        k.products
            .add_product(ProductDraft {
                name: name.to_string(),
                portion_count: Decimal::from(portions),
                unit: "kg".to_string(),
                portion_size: Decimal::new(5, 1),
            })
            .await
            .unwrap()
    }

    async fn dish(k: &Kitchen, name: &str, products: &[&Product]) -> MenuItem {
        k.menu_items
            .add_menu_item(MenuItemDraft {
                name: name.to_string(),
                product_ids: products.iter().map(|p| p.id_typed()).collect(),
            })
            .await
            .unwrap()
    }

    async fn portions_left(k: &Kitchen, id: ProductId) -> Decimal {
        k.products
            .get_product(id)
            .await
            .unwrap()
            .unwrap()
            .portion_count()
    }

    #[tokio::test]
    async fn ordering_once_takes_one_portion() {
        let k = setup();
        let p = stock(&k, "Potato", 5).await;
        let m = dish(&k, "Fries", &[&p]).await;

        let order = k.orders.place_order(order_of(vec![m.id_typed()])).await.unwrap();

        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::from(4));
        let stored = k.orders.get_order(order.id_typed()).await.unwrap().unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn ordering_twice_with_one_portion_fails_and_keeps_stock() {
        let k = setup();
        let p = stock(&k, "Potato", 1).await;
        let m = dish(&k, "Fries", &[&p]).await;

        let err = k
            .orders
            .place_order(order_of(vec![m.id_typed(), m.id_typed()]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Conflict { ref subject, .. }) if subject == "Potato"
        ));
        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::ONE);
        assert!(k.orders.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_product_loses_one_portion_per_line_using_it() {
        let k = setup();
        let bun = stock(&k, "Bun", 10).await;
        let patty = stock(&k, "Patty", 10).await;
        let cheese = stock(&k, "Cheese", 10).await;
        let burger = dish(&k, "Burger", &[&bun, &patty]).await;
        let cheeseburger = dish(&k, "Cheeseburger", &[&bun, &patty, &cheese]).await;

        k.orders
            .place_order(order_of(vec![
                burger.id_typed(),
                cheeseburger.id_typed(),
                burger.id_typed(),
            ]))
            .await
            .unwrap();

        assert_eq!(portions_left(&k, bun.id_typed()).await, Decimal::from(7));
        assert_eq!(portions_left(&k, patty.id_typed()).await, Decimal::from(7));
        assert_eq!(portions_left(&k, cheese.id_typed()).await, Decimal::from(9));
    }

    #[tokio::test]
    async fn shortage_on_one_product_rolls_back_the_others() {
        let k = setup();
        let rice = stock(&k, "Rice", 5).await;
        let saffron = stock(&k, "Saffron", 1).await;
        let plain = dish(&k, "Plain Rice", &[&rice]).await;
        let paella = dish(&k, "Paella", &[&rice, &saffron]).await;

        let err = k
            .orders
            .place_order(order_of(vec![plain.id_typed(), paella.id_typed(), paella.id_typed()]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict { .. })));
        assert_eq!(portions_left(&k, rice.id_typed()).await, Decimal::from(5));
        assert_eq!(portions_left(&k, saffron.id_typed()).await, Decimal::ONE);
    }

    #[tokio::test]
    async fn unknown_menu_item_fails_and_keeps_stock() {
        let k = setup();
        let p = stock(&k, "Potato", 5).await;
        let m = dish(&k, "Fries", &[&p]).await;

        let err = k
            .orders
            .place_order(order_of(vec![m.id_typed(), MenuItemId::new()]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::NotFound { entity: "menu item", .. })
        ));
        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::from(5));
    }

    #[tokio::test]
    async fn first_failing_line_decides_the_error() {
        let k = setup();
        let p = stock(&k, "Potato", 1).await;
        let fries = dish(&k, "Fries", &[&p]).await;

        let err = k
            .orders
            .place_order(order_of(vec![fries.id_typed(), fries.id_typed(), MenuItemId::new()]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict { .. })));

        let err = k
            .orders
            .place_order(order_of(vec![MenuItemId::new(), fries.id_typed(), fries.id_typed()]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::NotFound { entity: "menu item", .. })
        ));
        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::ONE);
    }

    #[tokio::test]
    async fn invalid_order_is_rejected_before_touching_storage() {
        let k = setup();

        let err = k.orders.place_order(OrderDraft::default()).await.unwrap_err();

        match err {
            ServiceError::Domain(DomainError::Validation(v)) => assert_eq!(v.len(), 2),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn order_with_no_lines_is_placed_without_stock_effect() {
        let k = setup();
        let p = stock(&k, "Potato", 2).await;

        k.orders.place_order(order_of(vec![])).await.unwrap();

        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::from(2));
        assert_eq!(k.orders.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_order_replaces_lines_without_touching_stock() {
        let k = setup();
        let p = stock(&k, "Potato", 5).await;
        let fries = dish(&k, "Fries", &[&p]).await;
        let mash = dish(&k, "Mash", &[&p]).await;
        let order = k.orders.place_order(order_of(vec![fries.id_typed()])).await.unwrap();

        let updated = k
            .orders
            .update_order(order.id_typed(), order_of(vec![mash.id_typed(), mash.id_typed()]))
            .await
            .unwrap();

        assert_eq!(updated.menu_item_ids(), &[mash.id_typed(), mash.id_typed()]);
        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::from(4));
    }

    #[tokio::test]
    async fn update_order_checks_order_and_menu_items_exist() {
        let k = setup();
        let p = stock(&k, "Potato", 5).await;
        let fries = dish(&k, "Fries", &[&p]).await;
        let order = k.orders.place_order(order_of(vec![fries.id_typed()])).await.unwrap();

        let missing_order = k
            .orders
            .update_order(OrderId::new(), order_of(vec![fries.id_typed()]))
            .await
            .unwrap_err();
        assert!(matches!(
            missing_order,
            ServiceError::Domain(DomainError::NotFound { entity: "order", .. })
        ));

        let missing_dish = k
            .orders
            .update_order(order.id_typed(), order_of(vec![MenuItemId::new()]))
            .await
            .unwrap_err();
        assert!(matches!(
            missing_dish,
            ServiceError::Domain(DomainError::NotFound { entity: "menu item", .. })
        ));
        let stored = k.orders.get_order(order.id_typed()).await.unwrap().unwrap();
        assert_eq!(stored.menu_item_ids(), &[fries.id_typed()]);
    }

    #[tokio::test]
    async fn deleting_unknown_ids_is_a_no_op() {
        let k = setup();

        k.products.delete_product(ProductId::new()).await.unwrap();
        k.menu_items.delete_menu_item(MenuItemId::new()).await.unwrap();
        k.orders.delete_order(OrderId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_product_removes_it_from_menu_items() {
        let k = setup();
        let tomato = stock(&k, "Tomato", 3).await;
        let basil = stock(&k, "Basil", 3).await;
        let salad = dish(&k, "Caprese", &[&tomato, &basil]).await;

        k.products.delete_product(tomato.id_typed()).await.unwrap();

        let salad = k.menu_items.get_menu_item(salad.id_typed()).await.unwrap().unwrap();
        assert_eq!(salad.product_ids(), &[basil.id_typed()]);
    }

    #[tokio::test]
    async fn deleting_a_menu_item_keeps_past_orders() {
        let k = setup();
        let p = stock(&k, "Potato", 3).await;
        let fries = dish(&k, "Fries", &[&p]).await;
        let order = k.orders.place_order(order_of(vec![fries.id_typed()])).await.unwrap();

        k.menu_items.delete_menu_item(fries.id_typed()).await.unwrap();

        let stored = k.orders.get_order(order.id_typed()).await.unwrap().unwrap();
        assert_eq!(stored.menu_item_ids(), &[fries.id_typed()]);
        assert!(k.menu_items.get_menu_item(fries.id_typed()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn menu_item_writes_require_known_products() {
        let k = setup();
        let p = stock(&k, "Potato", 3).await;
        let ghost = ProductId::new();

        let err = k
            .menu_items
            .add_menu_item(MenuItemDraft {
                name: "Ghost Soup".to_string(),
                product_ids: vec![p.id_typed(), ghost],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::NotFound { entity: "product", ref id }) if *id == ghost.to_string()
        ));
        assert!(k.menu_items.list_menu_items().await.unwrap().is_empty());

        let fries = dish(&k, "Fries", &[&p]).await;
        let err = k
            .menu_items
            .update_menu_item(
                fries.id_typed(),
                MenuItemDraft {
                    name: "Fries".to_string(),
                    product_ids: vec![ghost],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn menu_item_reports_the_first_listed_unknown_product() {
        let k = setup();
        let p = stock(&k, "Potato", 3).await;
        let mut ghosts = [ProductId::new(), ProductId::new()];
        ghosts.sort();
        let [low, high] = ghosts;

        let err = k
            .menu_items
            .add_menu_item(MenuItemDraft {
                name: "Ghost Soup".to_string(),
                product_ids: vec![p.id_typed(), high, low],
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::NotFound { entity: "product", ref id }) if *id == high.to_string()
        ));
    }

    #[tokio::test]
    async fn product_validation_reports_every_rule() {
        let k = setup();

        let err = k
            .products
            .add_product(ProductDraft {
                name: String::new(),
                portion_count: Decimal::ZERO,
                unit: String::new(),
                portion_size: Decimal::ZERO,
            })
            .await
            .unwrap_err();

        match err {
            ServiceError::Domain(DomainError::Validation(v)) => assert_eq!(v.len(), 4),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(k.products.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_product_replaces_fields_and_reports_unknown_ids() {
        let k = setup();
        let p = stock(&k, "Potato", 3).await;
        let draft = ProductDraft {
            name: "Sweet Potato".to_string(),
            portion_count: Decimal::from(8),
            unit: "units".to_string(),
            portion_size: Decimal::ONE,
        };

        let updated = k.products.update_product(p.id_typed(), draft.clone()).await.unwrap();
        assert_eq!(updated.name(), "Sweet Potato");
        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::from(8));

        let err = k.products.update_product(ProductId::new(), draft).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::NotFound { entity: "product", .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_orders_never_oversell() {
        let k = Arc::new(setup());
        let p = stock(&k, "Lobster", 3).await;
        let m = dish(&k, "Lobster Roll", &[&p]).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let k = k.clone();
            let menu_item_id = m.id_typed();
            handles.push(tokio::spawn(async move {
                k.orders.place_order(order_of(vec![menu_item_id])).await.is_ok()
            }));
        }
        let mut placed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                placed += 1;
            }
        }

        assert_eq!(placed, 3);
        assert_eq!(portions_left(&k, p.id_typed()).await, Decimal::ZERO);
        assert_eq!(k.orders.list_orders().await.unwrap().len(), 3);
    }
}
