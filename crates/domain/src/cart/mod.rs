//! Cart engine.

mod commands;
mod model;
mod service;

pub use commands::{CartItemInput, CreateCart, MAX_QUANTITY, UpdateCartItems};
pub use model::{Cart, CartItem, CartStatus, CartView, ONE_ACTIVE_PER_USER};
pub use service::{ACTIVE_CART_EXISTS, CartService};
