//! Request extractors that report failures as [`ApiError`]s.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use common::RecordId;
use domain::{DomainError, FieldErrors};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body whose rejections become 400 responses in the API's
/// error shape.
///
/// Malformed JSON is a plain bad request. A well-formed body whose values
/// have the wrong shape is a validation failure naming the offending field.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        serde_path_to_error::deserialize(value)
            .map(JsonBody)
            .map_err(shape_rejection)
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection, "rejected request body");
    ApiError::BadRequest(rejection.body_text())
}

fn shape_rejection(err: serde_path_to_error::Error<serde_json::Error>) -> ApiError {
    let message = err.inner().to_string();
    let field = field_path(&err.path().to_string(), &message);
    tracing::debug!(%field, error = %message, "request body has the wrong shape");
    ApiError::Domain(DomainError::Validation(FieldErrors::single(field, message)))
}

/// Dotted path of the offending value; a missing field is named itself.
fn field_path(path: &str, message: &str) -> String {
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next());

    match (path, missing) {
        (".", Some(name)) => name.to_string(),
        (".", None) => "body".to_string(),
        (path, Some(name)) => format!("{path}.{name}"),
        (path, None) => path.to_string(),
    }
}

/// Parses a path segment into a record id.
pub fn parse_id(id: &str) -> Result<RecordId, ApiError> {
    RecordId::parse(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
