//! Domain layer for the storefront backend.
//!
//! This crate provides:
//! - User directory and product catalog services
//! - Cart engine enforcing one active cart per user
//! - Order ledger with totals recomputed before every write
//! - Shared money, pricing, and validation helpers

pub mod cart;
pub mod error;
pub mod order;
pub mod pricing;
pub mod product;
mod references;
pub mod user;
pub mod validation;

pub use cart::{
    ACTIVE_CART_EXISTS, Cart, CartItem, CartItemInput, CartService, CartStatus, CartView,
    CreateCart, UpdateCartItems,
};
pub use error::DomainError;
pub use order::{
    CreateOrder, Order, OrderItem, OrderItemInput, OrderService, OrderStatus, PaymentMethod,
    PaymentStatus, ShippingAddress, UpdateOrder,
};
pub use pricing::{CartPricing, Money};
pub use product::{CreateProduct, Product, ProductService, ProductSummary, UpdateProduct};
pub use user::{Address, Role, User, UserDetails, UserService, UserSummary};
pub use validation::{FieldError, FieldErrors};
