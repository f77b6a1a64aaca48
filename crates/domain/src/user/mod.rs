//! User directory.

mod commands;
mod model;
mod service;

pub use commands::UserDetails;
pub use model::{Address, EMAIL_UNIQUE, Role, User, UserSummary};
pub use service::UserService;
