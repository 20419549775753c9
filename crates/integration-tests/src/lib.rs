//! Integration tests for Bespoke Baby.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bespoke-baby-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenario` - A full browsing session against in-memory collaborators
//! - `local_storage` - Cart and pixel outbox files surviving a restart

#![cfg_attr(not(test), forbid(unsafe_code))]
