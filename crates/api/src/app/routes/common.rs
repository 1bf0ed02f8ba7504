use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;

use restaurant_core::DomainError;

use crate::app::errors;

/// Parse a path id, answering 400 `invalid_id` on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}

/// Unwrap a JSON body, answering 400 `invalid_body` when it cannot be read.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(v)| v)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

/// An update body must name the resource it updates.
pub fn ensure_same_id<T: PartialEq + std::fmt::Display>(
    path_id: T,
    body_id: Option<T>,
) -> Result<(), axum::response::Response> {
    match body_id {
        Some(body_id) if body_id == path_id => Ok(()),
        Some(body_id) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "id_mismatch",
            format!("body id {body_id} does not match path id {path_id}"),
        )),
        None => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "id_mismatch",
            format!("body id is missing; expected {path_id}"),
        )),
    }
}
