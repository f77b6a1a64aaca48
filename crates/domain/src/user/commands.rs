use serde::Deserialize;
use validator::Validate;

use super::Address;
use crate::validation::validate_not_blank;

/// Profile fields supplied on registration and on full updates.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserDetails {
    #[validate(custom(function = "validate_not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(range(min = 18, message = "Must be over 18"))]
    pub age: i64,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub address: Option<Address>,

    #[serde(default)]
    pub hobbies: Vec<String>,
}
