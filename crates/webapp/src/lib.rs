//! Lavka Webapp - Telegram Mini App storefront backend.
//!
//! The Mini App webview renders session state and posts UI events to this
//! service. The service owns the session state machine (catalog, cart,
//! loyalty balance, address selection), performs the multi-step checkout
//! against a hosted Supabase table store over PostgREST, and notifies the
//! operator's Telegram chat about each order, best-effort.
//!
//! # Architecture
//!
//! - Axum web framework with a JSON API surface (no HTML)
//! - Supabase (PostgREST) for users, products, addresses, orders
//! - Telegram init-data for identity, Bot API for order notifications
//! - In-memory per-user sessions; cart state does not survive a restart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod supabase;
pub mod telegram;

pub use config::WebappConfig;
pub use routes::AppState;
