//! Product service providing catalog management.

use chrono::Utc;
use common::RecordId;
use document_store::{DocumentStore, DocumentStoreExt, Filter};
use serde_json::json;
use validator::Validate;

use super::{CreateProduct, Product, UpdateProduct};
use crate::cart::{Cart, CartStatus};
use crate::error::DomainError;
use crate::order::Order;
use crate::pricing::Money;
use crate::validation::FieldErrors;

/// Service for managing the product catalog.
#[derive(Clone)]
pub struct ProductService<S> {
    store: S,
}

impl<S: DocumentStore> ProductService<S> {
    /// Creates a new product service backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.find_all().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: &RecordId) -> Result<Product, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    /// Adds a product to the catalog.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        cmd.validate()?;

        let now = Utc::now();
        let product = Product {
            id: RecordId::new(),
            name: cmd.name.trim().to_string(),
            price: Money::from_cents(cmd.price_cents),
            description: cmd.description,
            category: cmd.category,
            stock: stock_count(cmd.stock)?,
            is_available: cmd.is_available,
            image_url: cmd.image_url,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&product).await?;

        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, price = %product.price, "product created");
        Ok(product)
    }

    /// Applies a partial update to a product.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: &RecordId,
        patch: UpdateProduct,
    ) -> Result<Product, DomainError> {
        patch.validate()?;

        let mut product = self.get_product(id).await?;
        if let Some(name) = patch.name {
            product.name = name.trim().to_string();
        }
        if let Some(price_cents) = patch.price_cents {
            product.price = Money::from_cents(price_cents);
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        if let Some(category) = patch.category {
            product.category = Some(category);
        }
        if let Some(stock) = patch.stock {
            product.stock = stock_count(stock)?;
        }
        if let Some(is_available) = patch.is_available {
            product.is_available = is_available;
        }
        if let Some(image_url) = patch.image_url {
            product.image_url = image_url;
        }
        product.updated_at = Utc::now();

        if !self.store.replace(&product).await? {
            return Err(DomainError::not_found("Product", id));
        }
        Ok(product)
    }

    /// Deletes a product unless an active cart or any order refers to it.
    ///
    /// Like user deletion, the guard is not atomic with the delete.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: &RecordId) -> Result<Product, DomainError> {
        self.get_product(id).await?;

        let line = json!({ "product_id": id.as_str() });
        let in_active_cart = self
            .store
            .exists::<Cart>(
                Filter::new()
                    .eq("status", CartStatus::Active.as_str())
                    .has_element("items", line.clone()),
            )
            .await?;
        if in_active_cart
            || self
                .store
                .exists::<Order>(Filter::new().has_element("items", line))
                .await?
        {
            return Err(DomainError::Conflict(
                "Product is referenced by an active cart or an order".to_string(),
            ));
        }

        let product = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))?;

        metrics::counter!("products_deleted_total").increment(1);
        Ok(product)
    }
}

fn stock_count(stock: i64) -> Result<u32, DomainError> {
    u32::try_from(stock).map_err(|_| {
        DomainError::Validation(FieldErrors::single(
            "stock",
            "Stock must be a non-negative integer",
        ))
    })
}
