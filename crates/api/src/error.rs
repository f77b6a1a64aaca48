//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use serde_json::json;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        metrics::counter!("http_errors_total", "status" => status.as_u16().to_string())
            .increment(1);
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, serde_json::Value) {
    match err {
        DomainError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Validation failed", "errors": errors }),
        ),
        DomainError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            json!({ "error": format!("{entity} not found"), "id": id }),
        ),
        DomainError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
        err @ (DomainError::Store(_) | DomainError::PasswordHash(_)) => {
            tracing::error!(error = %err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::StoreError;
    use domain::FieldErrors;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_field_errors() {
        let err = DomainError::Validation(FieldErrors::single("age", "Must be over 18"));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "age");
        assert_eq!(body["errors"][0]["message"], "Must be over 18");
    }

    #[tokio::test]
    async fn not_found_and_conflict() {
        let (status, body) = render(DomainError::not_found("Cart", "abc").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Cart not found");
        assert_eq!(body["id"], "abc");

        let (status, _) = render(DomainError::Conflict("taken".to_string()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn store_failures_are_opaque() {
        let decode = serde_json::from_str::<u8>("not json").unwrap_err();
        let err = DomainError::Store(StoreError::Serialization(decode));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
