//! Core type definitions.

pub mod id;
pub mod status;

pub use id::{AddressId, OrderId, OrderItemId, ProductId, TelegramId, UserId};
pub use status::OrderStatus;
