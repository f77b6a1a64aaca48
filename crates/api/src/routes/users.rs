//! User CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::RecordId;
use document_store::DocumentStore;
use domain::{Address, Order, Role, User, UserDetails};
use serde::Serialize;

use super::MessageResponse;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, parse_id};

/// A user as returned by the API. The password hash is never included.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub age: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub role: Role,
    pub is_active: bool,
    pub hobbies: Vec<String>,
    pub posts: Vec<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            address: user.address,
            role: user.role,
            is_active: user.is_active,
            hobbies: user.hobbies,
            posts: user.posts,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// GET /api/users
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users
#[tracing::instrument(skip(state, details))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(details): JsonBody<UserDetails>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.users.create_user(details).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/users/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get_user(&parse_id(&id)?).await?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{id}
#[tracing::instrument(skip(state, details))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    JsonBody(details): JsonBody<UserDetails>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.update_user(&parse_id(&id)?, details).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.delete_user(&parse_id(&id)?).await?;
    Ok(Json(MessageResponse::deleted("User")))
}

/// GET /api/users/{id}/orders — newest first.
#[tracing::instrument(skip(state))]
pub async fn orders<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.orders.get_orders_for_user(&parse_id(&id)?).await?;
    Ok(Json(orders))
}
