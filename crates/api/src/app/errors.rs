use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{json, Value};

use restaurant_core::DomainError;
use restaurant_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(violations) => json_error_with(
            StatusCode::BAD_REQUEST,
            "validation_error",
            message,
            json!({ "details": violations }),
        ),
        DomainError::NotFound { entity, id } => json_error_with(
            StatusCode::NOT_FOUND,
            "not_found",
            message,
            json!({ "entity": entity, "id": id }),
        ),
        DomainError::Conflict { subject, .. } => json_error_with(
            StatusCode::CONFLICT,
            "conflict",
            message,
            json!({ "subject": subject }),
        ),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    json_error_with(status, code, message, Value::Null)
}

/// Like [`json_error`], with the fields of `extra` (a JSON object) merged into the body.
pub fn json_error_with(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    extra: Value,
) -> axum::response::Response {
    let mut body = json!({
        "error": code,
        "message": message.into(),
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    (status, axum::Json(body)).into_response()
}
