//! CLI command implementations.

pub mod check;
pub mod notify;
pub mod seed;
