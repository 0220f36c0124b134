//! Telegram adapters: identity bootstrap from Mini App init-data and the
//! best-effort order notification sink.

pub mod identity;
pub mod notify;

pub use identity::{HostDirectives, resolve_identity};
pub use notify::OrderNotifier;
