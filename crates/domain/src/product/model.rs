use chrono::{DateTime, Utc};
use common::RecordId;
use document_store::Document;
use serde::{Deserialize, Serialize};

use crate::pricing::Money;

/// A sellable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "price_cents")]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub stock: u32,
    pub is_available: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// The product fields embedded when a cart is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "price_cents")]
    pub price: Money,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        }
    }
}
