//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::RecordId;
use document_store::DocumentStore;
use domain::{Cart, CartStatus, CartView, CreateCart, ProductSummary, UpdateCartItems, UserSummary};
use serde::Serialize;

use super::MessageResponse;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, parse_id};

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub product_id: RecordId,
    pub quantity: u32,
    /// Resolved product, absent when not populated or no longer in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: RecordId,
    pub user_id: RecordId,
    /// Resolved owner, absent when not populated or no longer registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    pub items: Vec<CartItemResponse>,
    pub total_price_cents: i64,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartView {
            cart,
            owner: None,
            products: Default::default(),
        }
        .into()
    }
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        let items = view
            .cart
            .items
            .iter()
            .map(|item| CartItemResponse {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                product: view.product(item).cloned(),
            })
            .collect();

        Self {
            id: view.cart.id,
            user_id: view.cart.user_id,
            user: view.owner,
            items,
            total_price_cents: view.cart.total_price.cents(),
            status: view.cart.status,
            created_at: view.cart.created_at,
            updated_at: view.cart.updated_at,
        }
    }
}

/// GET /api/carts
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CartResponse>>, ApiError> {
    let carts = state.carts.list_carts().await?;
    Ok(Json(carts.into_iter().map(CartResponse::from).collect()))
}

/// POST /api/carts — 409 when the user already has an active cart.
#[tracing::instrument(skip(state, cmd))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(cmd): JsonBody<CreateCart>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let cart = state.carts.create_cart(cmd).await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// GET /api/carts/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let view = state.carts.get_cart(&parse_id(&id)?).await?;
    Ok(Json(view.into()))
}

/// GET /api/carts/user/{user_id} — the user's active cart.
#[tracing::instrument(skip(state))]
pub async fn active_for_user<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let view = state.carts.get_active_cart(&parse_id(&user_id)?).await?;
    Ok(Json(view.into()))
}

/// PUT /api/carts/{id} — replaces the items.
#[tracing::instrument(skip(state, cmd))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(cmd): JsonBody<UpdateCartItems>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.update_cart_items(&parse_id(&id)?, cmd).await?;
    Ok(Json(cart.into()))
}

/// DELETE /api/carts/{id}/clear
#[tracing::instrument(skip(state))]
pub async fn clear<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.clear_cart(&parse_id(&id)?).await?;
    Ok(Json(cart.into()))
}

/// DELETE /api/carts/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.carts.delete_cart(&parse_id(&id)?).await?;
    Ok(Json(MessageResponse::deleted("Cart")))
}
