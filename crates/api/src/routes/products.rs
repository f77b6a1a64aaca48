//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use document_store::DocumentStore;
use domain::{CreateProduct, Product, UpdateProduct};

use super::MessageResponse;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, parse_id};

/// GET /api/products
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.list_products().await?))
}

/// POST /api/products
#[tracing::instrument(skip(state, cmd))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(cmd): JsonBody<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.products.create_product(cmd).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.get_product(&parse_id(&id)?).await?))
}

/// PUT /api/products/{id} — partial update.
#[tracing::instrument(skip(state, patch))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    let product = state.products.update_product(&parse_id(&id)?, patch).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.products.delete_product(&parse_id(&id)?).await?;
    Ok(Json(MessageResponse::deleted("Product")))
}
