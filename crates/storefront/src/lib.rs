//! Bespoke Baby storefront library.
//!
//! The shopping cart, its local persistence, the rendered cart view,
//! notifications, and the tracking pixel plumbing behind the storefront page.
//! [`Storefront`] is the entry point; everything it is wired to is injected
//! so the same core runs in the CLI and in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod engagement;
pub mod error;
pub mod notifications;
pub mod state;
pub mod store;
pub mod tracking;
pub mod view;

pub use cart::{Cart, CartItem, CartManager, CheckoutStart, PendingCheckout, Receipt};
pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use state::{Checkout, Collaborators, ScheduledCheckout, Storefront};
