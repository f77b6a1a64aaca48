//! Product catalog.

mod commands;
mod model;
mod service;

pub use commands::{CreateProduct, MAX_STOCK, UpdateProduct};
pub use model::{Product, ProductSummary};
pub use service::ProductService;
