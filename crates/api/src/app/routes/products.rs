use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use restaurant_core::{DomainError, Entity, ProductId};
use restaurant_products::Product;

use crate::app::dto::{ProductRequest, ProductResponse};
use crate::app::errors;
use crate::app::routes::common::{ensure_same_id, json_body, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.products.list_products().await {
        Ok(products) => {
            let items = products.iter().map(ProductResponse::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.get_product(id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(ProductResponse::from(&product))).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::not_found(Product::KIND, id)),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.add_product(body.into_draft()).await {
        Ok(product) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/api/products/{}", product.id_typed()))],
            Json(ProductResponse::from(&product)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
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
    match services.products.update_product(id, body.into_draft()).await {
        Ok(product) => (StatusCode::OK, Json(ProductResponse::from(&product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
