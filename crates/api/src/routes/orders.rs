//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use document_store::DocumentStore;
use domain::{CreateOrder, Order, UpdateOrder};
use serde::Deserialize;

use super::MessageResponse;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, parse_id};

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub user_id: Option<String>,
}

/// GET /api/orders[?user_id=]
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user_id = query.user_id.as_deref().map(parse_id).transpose()?;
    Ok(Json(state.orders.list_orders(user_id.as_ref()).await?))
}

/// POST /api/orders
#[tracing::instrument(skip(state, cmd))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(cmd): JsonBody<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.orders.create_order(cmd).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.get_order(&parse_id(&id)?).await?))
}

/// PUT /api/orders/{id} — partial update; the total is always recomputed.
#[tracing::instrument(skip(state, patch))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UpdateOrder>,
) -> Result<Json<Order>, ApiError> {
    let order = state.orders.update_order(&parse_id(&id)?, patch).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.orders.delete_order(&parse_id(&id)?).await?;
    Ok(Json(MessageResponse::deleted("Order")))
}
