use chrono::{DateTime, Utc};
use common::RecordId;
use document_store::Document;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{OrderStatus, PaymentMethod, PaymentStatus};
use crate::pricing::{Money, TotalOutOfRange, line_total, sum_line_totals};
use crate::validation::validate_not_blank;

/// Where an order ships to. Only `state` is optional.
///
/// Missing fields deserialize as empty strings so validation can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ShippingAddress {
    #[validate(custom(function = "validate_not_blank", message = "Street is required"))]
    pub street: String,

    #[validate(custom(function = "validate_not_blank", message = "City is required"))]
    pub city: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Postal code is required"))]
    pub postal_code: String,

    #[validate(custom(function = "validate_not_blank", message = "Country is required"))]
    pub country: String,
}

/// A purchased line with its unit price frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: RecordId,
    pub quantity: u32,
    #[serde(rename = "price_at_purchase_cents")]
    pub price_at_purchase: Money,
}

impl OrderItem {
    pub fn new(product_id: RecordId, quantity: u32, price_at_purchase: Money) -> Self {
        Self {
            product_id,
            quantity,
            price_at_purchase,
        }
    }

    /// Returns quantity times the purchase price.
    pub fn total_price(&self) -> Result<Money, TotalOutOfRange> {
        line_total(self.quantity, self.price_at_purchase)
    }
}

/// A purchase record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub user_id: RecordId,
    pub items: Vec<OrderItem>,
    #[serde(rename = "total_amount_cents")]
    pub total_amount: Money,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of every line at its purchase price.
    pub fn computed_total(&self) -> Result<Money, TotalOutOfRange> {
        sum_line_totals(
            self.items
                .iter()
                .map(|item| (item.quantity, item.price_at_purchase)),
        )
    }

    /// Overwrites the stored total with the computed one.
    ///
    /// On overflow the stored total is left untouched.
    pub fn recompute_total(&mut self) -> Result<(), TotalOutOfRange> {
        self.total_amount = self.computed_total()?;
        Ok(())
    }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: Vec<OrderItem>, total: i64) -> Order {
        let now = Utc::now();
        Order {
            id: RecordId::new(),
            user_id: RecordId::new(),
            items,
            total_amount: Money::from_cents(total),
            shipping_address: ShippingAddress::default(),
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::default(),
            order_status: OrderStatus::default(),
            ordered_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn recompute_total_overrides_stored_value() {
        let mut o = order(
            vec![
                OrderItem::new(RecordId::new(), 3, Money::from_cents(1000)),
                OrderItem::new(RecordId::new(), 1, Money::from_cents(500)),
            ],
            1,
        );
        o.recompute_total().unwrap();
        assert_eq!(o.total_amount.cents(), 3500);
        assert_eq!(o.items[0].total_price(), Ok(Money::from_cents(3000)));
    }

    #[test]
    fn missing_address_fields_fail_validation() {
        let address: ShippingAddress =
            serde_json::from_value(serde_json::json!({ "street": "1 Main St" })).unwrap();
        let err = address.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("city"));
        assert!(fields.contains_key("postal_code"));
        assert!(fields.contains_key("country"));
        assert!(!fields.contains_key("street"));
    }

    #[test]
    fn state_is_optional() {
        let address = ShippingAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: None,
            postal_code: "12345".to_string(),
            country: "US".to_string(),
        };
        assert!(address.validate().is_ok());
    }
}
