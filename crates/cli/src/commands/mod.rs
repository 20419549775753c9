//! Subcommand implementations.
//!
//! - [`cart`] - Add, remove, show and check out
//! - [`engage`] - Newsletter and contact forms, page engagement triggers

pub mod cart;
pub mod engage;

use bespoke_baby_storefront::StorefrontError;
use bespoke_baby_storefront::config::ConfigError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The storefront rejected the operation.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Prices cannot be negative.
    #[error("Invalid price: {0} (must not be negative)")]
    NegativePrice(Decimal),
}
