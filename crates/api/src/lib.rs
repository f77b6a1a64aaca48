//! HTTP API server with observability for the storefront backend.
//!
//! Provides REST endpoints for users, products, carts, and orders under
//! `/api`, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get};
use document_store::DocumentStore;
use domain::{CartPricing, CartService, OrderService, ProductService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub users: UserService<S>,
    pub products: ProductService<S>,
    pub carts: CartService<S>,
    pub orders: OrderService<S>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/users",
            get(routes::users::list::<S>).post(routes::users::create::<S>),
        )
        .route(
            "/users/{id}",
            get(routes::users::get::<S>)
                .put(routes::users::update::<S>)
                .delete(routes::users::delete::<S>),
        )
        .route("/users/{id}/orders", get(routes::users::orders::<S>))
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .route(
            "/carts",
            get(routes::carts::list::<S>).post(routes::carts::create::<S>),
        )
        .route(
            "/carts/{id}",
            get(routes::carts::get::<S>)
                .put(routes::carts::update::<S>)
                .delete(routes::carts::delete::<S>),
        )
        .route("/carts/{id}/clear", delete(routes::carts::clear::<S>))
        .route(
            "/carts/user/{user_id}",
            get(routes::carts::active_for_user::<S>),
        )
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>)
                .put(routes::orders::update::<S>)
                .delete(routes::orders::delete::<S>),
        );

    Router::new()
        .route("/", get(routes::health::banner))
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service sharing `store`.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(
    store: S,
    cart_pricing: CartPricing,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        users: UserService::new(store.clone()),
        products: ProductService::new(store.clone()),
        carts: CartService::new(store.clone(), cart_pricing),
        orders: OrderService::new(store),
    })
}
