use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::RecordId;
use document_store::{Document, UniqueKey};
use serde::{Deserialize, Serialize};

use crate::pricing::Money;
use crate::product::ProductSummary;
use crate::user::UserSummary;

/// Constraint allowing a single active cart per user.
pub const ONE_ACTIVE_PER_USER: &str = "carts_one_active_per_user";

/// Lifecycle status of a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Active,
    Ordered,
    Cancelled,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "active",
            CartStatus::Ordered => "ordered",
            CartStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product and how many units of it are in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: RecordId,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product_id: RecordId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A user's shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: RecordId,
    pub user_id: RecordId,
    pub items: Vec<CartItem>,
    #[serde(rename = "total_price_cents")]
    pub total_price: Money,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Returns true if the cart still accepts item changes.
    pub fn is_active(&self) -> bool {
        self.status == CartStatus::Active
    }

    /// Removes every item and resets the total.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_price = Money::zero();
    }
}

impl Document for Cart {
    const COLLECTION: &'static str = "carts";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        if self.is_active() {
            vec![UniqueKey::new(ONE_ACTIVE_PER_USER, self.user_id.as_str())]
        } else {
            Vec::new()
        }
    }
}

/// A cart with its owner and products resolved.
///
/// References that no longer resolve are left out: `owner` is None and the
/// product is missing from `products`.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub cart: Cart,
    pub owner: Option<UserSummary>,
    pub products: HashMap<RecordId, ProductSummary>,
}

impl CartView {
    /// Looks up the resolved product of a cart item.
    pub fn product(&self, item: &CartItem) -> Option<&ProductSummary> {
        self.products.get(&item.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(status: CartStatus) -> Cart {
        let now = Utc::now();
        Cart {
            id: RecordId::new(),
            user_id: RecordId::new(),
            items: vec![CartItem::new(RecordId::new(), 2)],
            total_price: Money::from_cents(400),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_active_carts_claim_the_owner_key() {
        let active = cart(CartStatus::Active);
        assert_eq!(
            active.unique_keys(),
            vec![UniqueKey::new(ONE_ACTIVE_PER_USER, active.user_id.as_str())]
        );
        assert!(cart(CartStatus::Ordered).unique_keys().is_empty());
        assert!(cart(CartStatus::Cancelled).unique_keys().is_empty());
    }

    #[test]
    fn clear_empties_items_and_total() {
        let mut c = cart(CartStatus::Active);
        c.clear();
        assert!(c.items.is_empty());
        assert!(c.total_price.is_zero());
    }

    #[test]
    fn serializes_with_cents_suffix_and_lowercase_status() {
        let c = cart(CartStatus::Active);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["total_price_cents"], 400);
        assert_eq!(json["status"], "active");
        assert_eq!(json["items"][0]["quantity"], 2);
    }
}
