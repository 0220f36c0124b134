//! Domain row types for the Supabase collections plus the Telegram profile.
//!
//! These are serde mirrors of the PostgREST resources; validation and
//! business rules live in `state` and `checkout`, never here.

pub mod address;
pub mod catalog;
pub mod order;
pub mod user;

pub use address::{Address, NewAddress};
pub use catalog::{NewProduct, Product};
pub use order::{NewOrder, NewOrderItem, OrderItemRow, OrderRow};
pub use user::{TelegramUser, UserRow};
