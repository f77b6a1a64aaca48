use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::cart::MAX_QUANTITY;
use crate::pricing::Money;
use crate::validation::{FieldErrors, parse_id, validate_record_id};

fn validate_payment_method(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<PaymentMethod>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("payment_method"))
}

fn validate_payment_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<PaymentStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("payment_status"))
}

fn validate_order_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<OrderStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("order_status"))
}

/// A purchased line as supplied by a client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(custom(function = "validate_record_id", message = "Invalid Product ID format"))]
    pub product_id: String,

    #[validate(range(min = 1, max = MAX_QUANTITY, message = "Quantity must be at least 1"))]
    pub quantity: i64,

    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price_at_purchase_cents: i64,
}

impl OrderItemInput {
    pub fn new(product_id: impl ToString, quantity: i64, price_at_purchase_cents: i64) -> Self {
        Self {
            product_id: product_id.to_string(),
            quantity,
            price_at_purchase_cents,
        }
    }
}

/// Input for placing an order.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateOrder {
    #[serde(default)]
    #[validate(custom(function = "validate_record_id", message = "Invalid User ID format"))]
    pub user_id: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    #[validate(nested)]
    pub items: Vec<OrderItemInput>,

    /// Ignored in favour of the computed total; a mismatch is logged.
    #[validate(range(min = 0, message = "Total amount must be non-negative"))]
    pub total_amount_cents: Option<i64>,

    #[serde(default)]
    #[validate(custom(function = "validate_payment_method", message = "Invalid payment method"))]
    pub payment_method: String,

    #[serde(default)]
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
}

/// Partial order update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrder {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    #[validate(nested)]
    pub items: Option<Vec<OrderItemInput>>,

    #[validate(range(min = 0, message = "Total amount must be non-negative"))]
    pub total_amount_cents: Option<i64>,

    #[validate(nested)]
    pub shipping_address: Option<ShippingAddress>,

    #[validate(custom(function = "validate_payment_method", message = "Invalid payment method"))]
    pub payment_method: Option<String>,

    #[validate(custom(function = "validate_payment_status", message = "Invalid payment status"))]
    pub payment_status: Option<String>,

    #[validate(custom(function = "validate_order_status", message = "Invalid order status"))]
    pub order_status: Option<String>,
}

/// Converts validated inputs into order items.
pub(crate) fn into_order_items(inputs: Vec<OrderItemInput>) -> Result<Vec<OrderItem>, FieldErrors> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let product_id = parse_id(&format!("items[{index}].product_id"), &input.product_id)?;
            let quantity = u32::try_from(input.quantity).map_err(|_| {
                FieldErrors::single(
                    format!("items[{index}].quantity"),
                    "Quantity must be at least 1",
                )
            })?;
            Ok(OrderItem::new(
                product_id,
                quantity,
                Money::from_cents(input.price_at_purchase_cents),
            ))
        })
        .collect()
}

/// Parses a status string that already passed validation.
pub(crate) fn parse_status<T>(field: &str, value: &str) -> Result<T, FieldErrors>
where
    T: std::str::FromStr<Err = super::UnknownVariant>,
{
    value
        .parse()
        .map_err(|e: super::UnknownVariant| FieldErrors::single(field, e.to_string()))
}
