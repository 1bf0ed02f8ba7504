use axum::Router;

pub mod common;
pub mod menu_items;
pub mod orders;
pub mod products;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/menuitems", menu_items::router())
        .nest("/orders", orders::router())
}
