//! HTTP handlers grouped by resource.

pub mod carts;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod users;

use serde::Serialize;

/// Body returned by successful deletes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn deleted(entity: &str) -> Self {
        Self {
            message: format!("{entity} deleted successfully"),
        }
    }
}
