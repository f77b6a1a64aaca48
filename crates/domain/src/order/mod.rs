//! Order ledger.

mod commands;
mod model;
mod service;
mod status;

pub use commands::{CreateOrder, OrderItemInput, UpdateOrder};
pub use model::{Order, OrderItem, ShippingAddress};
pub use service::OrderService;
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, UnknownVariant};
