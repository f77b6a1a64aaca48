use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CartItem;
use crate::validation::{FieldErrors, parse_id, validate_record_id};

/// Upper bound for a line item quantity.
pub const MAX_QUANTITY: i64 = u32::MAX as i64;

fn default_quantity() -> i64 {
    1
}

/// A line item as supplied by a client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItemInput {
    #[validate(custom(function = "validate_record_id", message = "Invalid Product ID format"))]
    pub product_id: String,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = MAX_QUANTITY, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

impl CartItemInput {
    pub fn new(product_id: impl ToString, quantity: i64) -> Self {
        Self {
            product_id: product_id.to_string(),
            quantity,
        }
    }
}

/// Input for opening a cart.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateCart {
    #[serde(default)]
    #[validate(custom(function = "validate_record_id", message = "Invalid User ID format"))]
    pub user_id: String,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<CartItemInput>,
}

/// Replacement items for a cart. Absent items leave the cart unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCartItems {
    #[validate(length(min = 1, message = "Items array cannot be empty"))]
    #[validate(nested)]
    pub items: Option<Vec<CartItemInput>>,
}

/// Converts validated inputs into cart items.
pub(crate) fn into_cart_items(inputs: Vec<CartItemInput>) -> Result<Vec<CartItem>, FieldErrors> {
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
            Ok(CartItem::new(product_id, quantity))
        })
        .collect()
}
