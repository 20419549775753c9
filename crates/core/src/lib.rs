//! Bespoke Baby Core - Shared types library.
//!
//! This crate provides common types used across all Bespoke Baby components:
//! - `storefront` - Cart state, persistence, tracking and rendering
//! - `cli` - Command-line driver for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! tracking transports. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and cart phases

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
