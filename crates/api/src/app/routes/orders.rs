use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use restaurant_core::{DomainError, Entity, OrderId};
use restaurant_orders::Order;

use crate::app::dto::{OrderRequest, OrderResponse};
use crate::app::errors;
use crate::app::routes::common::{ensure_same_id, json_body, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

pub async fn list_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.orders.list_orders().await {
        Ok(orders) => {
            let items = orders.iter().map(OrderResponse::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.get_order(id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(OrderResponse::from(&order))).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::not_found(Order::KIND, id)),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Place an order. Stock shortfalls answer 409 and leave every product untouched.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.place_order(body.into_draft()).await {
        Ok(order) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/api/orders/{}", order.id_typed()))],
            Json(OrderResponse::from(&order)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Replace an order's timestamp and lines. Stock is not re-counted.
pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: OrderId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = ensure_same_id(id, body.id) {
        return resp;
    }
    match services.orders.update_order(id, body.into_draft()).await {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from(&order))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.orders.delete_order(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
