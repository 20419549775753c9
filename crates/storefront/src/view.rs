//! Rendered cart view.
//!
//! [`CartView`] is the display projection of a cart. A [`CartSurface`] is
//! anything that shows one: the HTML fragments below, a terminal, or nothing.
//! Rendering reads a snapshot and never touches cart state, so it is safe to
//! repeat.

use std::sync::RwLock;

use askama::Template;
use bespoke_baby_core::{CurrencyCode, Price};

use crate::cart::{Cart, CartItem};
use crate::error::Result;

/// Cart item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: usize,
}

impl CartView {
    /// Create an empty cart view priced in `currency_code`.
    #[must_use]
    pub fn empty(currency_code: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::zero(currency_code).display(),
            item_count: 0,
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            price: item.unit_price.display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total().display(),
            item_count: cart.len(),
        }
    }
}

/// Somewhere a cart view is shown.
pub trait CartSurface: Send + Sync {
    /// Replace whatever is shown with `view`.
    fn show(&self, view: &CartView);
}

/// Surface that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurface;

impl CartSurface for NoopSurface {
    fn show(&self, _view: &CartView) {}
}

/// Cart items fragment template.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate<'a> {
    pub cart: &'a CartView,
}

/// Cart count badge fragment template.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

/// Cart total fragment template.
#[derive(Template)]
#[template(path = "partials/cart_total.html")]
pub struct CartTotalTemplate<'a> {
    pub subtotal: &'a str,
}

/// The three HTML fragments of a rendered cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartFragments {
    /// Item-count badge.
    pub count_badge: String,
    /// Itemized list, or the empty-cart message.
    pub items: String,
    /// Formatted total.
    pub total: String,
}

impl CartFragments {
    /// Render all three fragments for `view`.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to render.
    pub fn render(view: &CartView) -> Result<Self> {
        Ok(Self {
            count_badge: CartCountTemplate {
                count: view.item_count,
            }
            .render()?,
            items: CartItemsTemplate { cart: view }.render()?,
            total: CartTotalTemplate {
                subtotal: &view.subtotal,
            }
            .render()?,
        })
    }
}

/// Surface that keeps the latest rendered HTML fragments.
///
/// Item names are HTML-escaped by the templates.
#[derive(Debug, Default)]
pub struct HtmlSurface {
    current: RwLock<CartFragments>,
}

impl HtmlSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered fragments.
    #[must_use]
    pub fn fragments(&self) -> CartFragments {
        self.current
            .read()
            .map(|fragments| fragments.clone())
            .unwrap_or_default()
    }
}

impl CartSurface for HtmlSurface {
    fn show(&self, view: &CartView) {
        let fragments = match CartFragments::render(view) {
            Ok(fragments) => fragments,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render cart fragments");
                return;
            }
        };
        if let Ok(mut current) = self.current.write() {
            *current = fragments;
        }
    }
}
