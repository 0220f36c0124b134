//! Integration tests for Lavka.
//!
//! The in-process behavior of the webapp is covered by the wiremock suite
//! in `crates/webapp/tests/`. The tests here run against a live deployment:
//! a started webapp binary pointed at real Supabase credentials.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the webapp with Supabase credentials in the environment
//! cargo run -p lavka-webapp
//!
//! # Run the live tests
//! cargo test -p lavka-integration-tests -- --ignored
//! ```
//!
//! `LAVKA_BASE_URL` overrides the target (default: `http://localhost:3000`).
