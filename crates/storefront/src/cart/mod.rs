//! Shopping cart state.
//!
//! [`Cart`] is a plain value: an ordered list of [`CartItem`]s plus the cached
//! running total. Transitions consume the old snapshot and return the new one,
//! so a caller can never observe items and total out of step.
//!
//! # Modules
//!
//! - [`manager`] - `CartManager`, which wires transitions to the store, the
//!   tracking sink, the rendered view and notifications
//! - [`persistence`] - Save and restore a cart through a `PersistenceStore`

pub mod manager;
pub mod persistence;

use bespoke_baby_core::{CartItemId, CurrencyCode, Price};
use serde::{Deserialize, Serialize};

pub use manager::{CartManager, CheckoutStart, PendingCheckout, Receipt};

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub name: String,
    pub unit_price: Price,
}

impl CartItem {
    /// Create a line item with a freshly generated ID.
    #[must_use]
    pub fn new(name: impl Into<String>, unit_price: Price) -> Self {
        Self {
            id: CartItemId::generate(),
            name: name.into(),
            unit_price,
        }
    }
}

/// Ordered line items plus their cached total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
}

impl Cart {
    /// An empty cart priced in `currency_code`.
    #[must_use]
    pub const fn empty(currency_code: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            total: Price::zero(currency_code),
        }
    }

    /// Build a cart from items, deriving the total from their prices.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>, currency_code: CurrencyCode) -> Self {
        let total = items
            .iter()
            .fold(Price::zero(currency_code), |sum, item| sum + item.unit_price);
        Self { items, total }
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of every item's unit price.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn get(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Append an item.
    #[must_use]
    pub fn with_item(mut self, item: CartItem) -> Self {
        self.total = self.total + item.unit_price;
        self.items.push(item);
        self
    }

    /// Remove the item with `id`, returning it alongside the new snapshot.
    ///
    /// An unknown ID yields the cart unchanged and `None`.
    #[must_use]
    pub fn without_item(mut self, id: CartItemId) -> (Self, Option<CartItem>) {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return (self, None);
        };
        let removed = self.items.remove(position);
        self.total = self.total - removed.unit_price;
        (self, Some(removed))
    }

    /// Drop every item, keeping the currency.
    #[must_use]
    pub fn cleared(self) -> Self {
        Self::empty(self.total.currency_code)
    }

    /// Comma-separated item names, in display order.
    #[must_use]
    pub fn item_names(&self) -> String {
        self.items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
