use serde::Deserialize;
use validator::Validate;

use crate::validation::{validate_image_url, validate_not_blank};

/// Upper bound for stock counts.
pub const MAX_STOCK: i64 = u32::MAX as i64;

fn default_available() -> bool {
    true
}

/// Input for adding a product to the catalog.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(custom(function = "validate_not_blank", message = "Product name is required"))]
    pub name: String,

    #[validate(range(min = 0, message = "Price must be non-negative"))]
    pub price_cents: i64,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[validate(range(min = 0, max = MAX_STOCK, message = "Stock must be a non-negative integer"))]
    pub stock: i64,

    #[serde(default = "default_available")]
    pub is_available: bool,

    #[validate(custom(function = "validate_image_url", message = "Must be a valid image URL"))]
    pub image_url: String,
}

/// Partial product update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(custom(function = "validate_not_blank", message = "Product name is required"))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "Price must be non-negative"))]
    pub price_cents: Option<i64>,

    pub description: Option<String>,

    pub category: Option<String>,

    #[validate(range(min = 0, max = MAX_STOCK, message = "Stock must be a non-negative integer"))]
    pub stock: Option<i64>,

    pub is_available: Option<bool>,

    #[validate(custom(function = "validate_image_url", message = "Must be a valid image URL"))]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldErrors;

    #[test]
    fn availability_defaults_to_true() {
        let input: CreateProduct = serde_json::from_value(serde_json::json!({
            "name": "Kettle",
            "price_cents": 2999,
            "stock": 4,
            "image_url": "https://img.example.com/kettle.png"
        }))
        .unwrap();
        assert!(input.is_available);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn negative_price_and_bad_url_are_reported() {
        let input = CreateProduct {
            name: "Kettle".to_string(),
            price_cents: -1,
            description: None,
            category: None,
            stock: -3,
            is_available: true,
            image_url: "kettle.png".to_string(),
        };

        let errors = FieldErrors::from(input.validate().unwrap_err());
        assert!(errors.contains("price_cents"));
        assert!(errors.contains("stock"));
        assert!(errors.contains("image_url"));
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(UpdateProduct::default().validate().is_ok());
    }

    #[test]
    fn patch_fields_are_checked_when_present() {
        let patch = UpdateProduct {
            name: Some(String::new()),
            ..Default::default()
        };
        let errors = FieldErrors::from(patch.validate().unwrap_err());
        assert_eq!(errors.fields()[0].message, "Product name is required");
    }
}
