//! Cart service enforcing one active cart per user.

use std::collections::HashMap;

use chrono::Utc;
use common::RecordId;
use document_store::{DocumentStore, DocumentStoreExt, Filter};
use validator::Validate;

use super::commands::into_cart_items;
use super::{
    Cart, CartItem, CartStatus, CartView, CreateCart, ONE_ACTIVE_PER_USER, UpdateCartItems,
};
use crate::error::DomainError;
use crate::pricing::{CartPricing, Money, sum_line_totals};
use crate::product::{Product, ProductSummary};
use crate::references::{require_products, require_user};
use crate::user::{User, UserSummary};
use crate::validation::{FieldErrors, parse_id};

/// Message returned when a user already owns an active cart.
pub const ACTIVE_CART_EXISTS: &str = "User already has an active cart.";

/// Service for managing shopping carts.
#[derive(Clone)]
pub struct CartService<S> {
    store: S,
    pricing: CartPricing,
}

impl<S: DocumentStore> CartService<S> {
    /// Creates a new cart service pricing carts with `pricing`.
    pub fn new(store: S, pricing: CartPricing) -> Self {
        Self { store, pricing }
    }

    /// Lists every cart with owners and products resolved.
    #[tracing::instrument(skip(self))]
    pub async fn list_carts(&self) -> Result<Vec<CartView>, DomainError> {
        let carts: Vec<Cart> = self.store.find_all().await?;
        self.populate(carts).await
    }

    /// Loads a cart by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, id: &RecordId) -> Result<CartView, DomainError> {
        let cart = self.load(id).await?;
        self.populate_one(cart).await
    }

    /// Loads the active cart of a user.
    #[tracing::instrument(skip(self))]
    pub async fn get_active_cart(&self, user_id: &RecordId) -> Result<CartView, DomainError> {
        let cart = self
            .find_active(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart", user_id))?;
        self.populate_one(cart).await
    }

    /// Opens a new active cart for a user.
    ///
    /// Fails with a conflict if the user already has an active cart. The
    /// store's unique key decides between concurrent attempts.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn create_cart(&self, cmd: CreateCart) -> Result<Cart, DomainError> {
        cmd.validate()?;
        let user_id = parse_id("user_id", &cmd.user_id)?;
        let items = into_cart_items(cmd.items)?;

        require_user(&self.store, &user_id).await?;
        if self.find_active(&user_id).await?.is_some() {
            return Err(active_cart_conflict());
        }

        let catalog = require_products(&self.store, items.iter().map(|i| &i.product_id)).await?;
        let now = Utc::now();
        let cart = Cart {
            id: RecordId::new(),
            user_id,
            total_price: self.price(&items, &catalog)?,
            items,
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(&cart)
            .await
            .map_err(|e| match e.violated_constraint() {
                Some(ONE_ACTIVE_PER_USER) => active_cart_conflict(),
                _ => DomainError::from(e),
            })?;

        metrics::counter!("carts_created_total").increment(1);
        tracing::info!(cart_id = %cart.id, total = %cart.total_price, "cart created");
        Ok(cart)
    }

    /// Replaces the items of a cart and reprices it.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn update_cart_items(
        &self,
        id: &RecordId,
        cmd: UpdateCartItems,
    ) -> Result<Cart, DomainError> {
        cmd.validate()?;
        let mut cart = self.load(id).await?;

        let Some(inputs) = cmd.items else {
            return Ok(cart);
        };
        let items = into_cart_items(inputs)?;
        let catalog = require_products(&self.store, items.iter().map(|i| &i.product_id)).await?;

        cart.total_price = self.price(&items, &catalog)?;
        cart.items = items;
        cart.updated_at = Utc::now();
        self.save(&cart).await?;

        tracing::debug!(cart_id = %cart.id, total = %cart.total_price, "cart items replaced");
        Ok(cart)
    }

    /// Empties a cart. Clearing an empty cart is a no-op that still succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn clear_cart(&self, id: &RecordId) -> Result<Cart, DomainError> {
        let mut cart = self.load(id).await?;
        cart.clear();
        cart.updated_at = Utc::now();
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Deletes a cart.
    #[tracing::instrument(skip(self))]
    pub async fn delete_cart(&self, id: &RecordId) -> Result<Cart, DomainError> {
        let cart = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart", id))?;

        metrics::counter!("carts_deleted_total").increment(1);
        Ok(cart)
    }

    async fn load(&self, id: &RecordId) -> Result<Cart, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart", id))
    }

    async fn save(&self, cart: &Cart) -> Result<(), DomainError> {
        if !self.store.replace(cart).await? {
            return Err(DomainError::not_found("Cart", &cart.id));
        }
        Ok(())
    }

    async fn find_active(&self, user_id: &RecordId) -> Result<Option<Cart>, DomainError> {
        Ok(self
            .store
            .find_one(
                Filter::new()
                    .eq("user_id", user_id.as_str())
                    .eq("status", CartStatus::Active.as_str()),
            )
            .await?)
    }

    fn price(
        &self,
        items: &[CartItem],
        catalog: &HashMap<RecordId, Product>,
    ) -> Result<Money, FieldErrors> {
        match self.pricing {
            CartPricing::Placeholder => Ok(Money::zero()),
            CartPricing::Catalog => sum_line_totals(items.iter().map(|item| {
                let price = catalog
                    .get(&item.product_id)
                    .map(|p| p.price)
                    .unwrap_or_default();
                (item.quantity, price)
            }))
            .map_err(|e| FieldErrors::single("total_price_cents", e.to_string())),
        }
    }

    async fn populate_one(&self, cart: Cart) -> Result<CartView, DomainError> {
        let refs = self.resolve(std::slice::from_ref(&cart)).await?;
        Ok(refs.view(cart))
    }

    async fn populate(&self, carts: Vec<Cart>) -> Result<Vec<CartView>, DomainError> {
        let refs = self.resolve(&carts).await?;
        Ok(carts.into_iter().map(|cart| refs.view(cart)).collect())
    }

    /// Resolves owners and products with one batch lookup each.
    async fn resolve(&self, carts: &[Cart]) -> Result<Resolved, DomainError> {
        let user_ids: Vec<RecordId> = carts.iter().map(|c| c.user_id.clone()).collect();
        let product_ids: Vec<RecordId> = carts
            .iter()
            .flat_map(|c| c.items.iter().map(|i| i.product_id.clone()))
            .collect();

        let owners = self
            .store
            .find_by_ids::<User>(&user_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();
        let products = self
            .store
            .find_by_ids::<Product>(&product_ids)
            .await?
            .iter()
            .map(|p| (p.id.clone(), ProductSummary::from(p)))
            .collect();

        Ok(Resolved { owners, products })
    }
}

struct Resolved {
    owners: HashMap<RecordId, UserSummary>,
    products: HashMap<RecordId, ProductSummary>,
}

impl Resolved {
    fn view(&self, cart: Cart) -> CartView {
        let products = cart
            .items
            .iter()
            .filter_map(|i| self.products.get(&i.product_id))
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        CartView {
            owner: self.owners.get(&cart.user_id).cloned(),
            products,
            cart,
        }
    }
}

fn active_cart_conflict() -> DomainError {
    metrics::counter!("cart_conflicts_total").increment(1);
    DomainError::Conflict(ACTIVE_CART_EXISTS.to_string())
}
