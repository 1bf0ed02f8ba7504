use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use restaurant_core::{DomainError, Entity, MenuItemId};
use restaurant_menu::MenuItem;

use crate::app::dto::{MenuItemRequest, MenuItemResponse};
use crate::app::errors;
use crate::app::routes::common::{ensure_same_id, json_body, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_menu_items).post(create_menu_item))
        .route(
            "/:id",
            get(get_menu_item).put(update_menu_item).delete(delete_menu_item),
        )
}

pub async fn list_menu_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.menu_items.list_menu_items().await {
        Ok(menu_items) => {
            let items = menu_items.iter().map(MenuItemResponse::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MenuItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.menu_items.get_menu_item(id).await {
        Ok(Some(menu_item)) => (StatusCode::OK, Json(MenuItemResponse::from(&menu_item))).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::not_found(MenuItem::KIND, id)),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<MenuItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.menu_items.add_menu_item(body.into_draft()).await {
        Ok(menu_item) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/api/menuitems/{}", menu_item.id_typed()))],
            Json(MenuItemResponse::from(&menu_item)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<MenuItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: MenuItemId = match parse_id(&id) {
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
    match services.menu_items.update_menu_item(id, body.into_draft()).await {
        Ok(menu_item) => (StatusCode::OK, Json(MenuItemResponse::from(&menu_item))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_menu_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MenuItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.menu_items.delete_menu_item(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
