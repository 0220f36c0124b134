//! Lavka Core - Shared types library.
//!
//! This crate provides common types used across all Lavka components:
//! - `webapp` - The Telegram Mini App backend
//! - `cli` - Command-line tools for seeding and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the order status enum

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
