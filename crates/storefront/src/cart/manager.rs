//! Cart manager: owns the cart and keeps its collaborators in sync.
//!
//! Every mutating operation applies a pure [`Cart`] transition, then persists
//! the new snapshot, re-renders the surface, records tracking events and shows
//! a notification, in that order. Collaborator failures are logged and never
//! change the outcome of the operation.

use std::sync::Arc;
use std::time::Duration;

use bespoke_baby_core::{CartItemId, CartPhase, CurrencyCode, Price};

use super::persistence;
use super::{Cart, CartItem};
use crate::error::add_breadcrumb;
use crate::notifications::{Notification, Notifier, SilentNotifier};
use crate::store::PersistenceStore;
use crate::tracking::{Tracker, TrackingEvent};
use crate::view::{CartSurface, CartView, NoopSurface};

/// Default pause between starting a checkout and completing the purchase.
pub const DEFAULT_CHECKOUT_DELAY: Duration = Duration::from_millis(1_500);

/// Result of asking to check out.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum CheckoutStart {
    /// Nothing to buy; the shopper was told so.
    EmptyCart,
    /// A checkout is already waiting on its delay.
    AlreadyInProgress,
    /// Checkout started; complete it after `PendingCheckout::delay`.
    Started(PendingCheckout),
}

/// A checkout waiting for its completion step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingCheckout {
    /// How long to wait before calling [`CartManager::complete_checkout`].
    pub delay: Duration,
    /// Cart total when checkout started.
    pub total: Price,
    /// Item count when checkout started.
    pub item_count: usize,
}

/// Summary of a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub total: Price,
    pub item_count: usize,
    pub item_names: String,
}

/// Owns one cart and its persistence, tracking, view and notifications.
pub struct CartManager {
    cart: Cart,
    phase: CartPhase,
    store: Arc<dyn PersistenceStore>,
    tracker: Tracker,
    surface: Arc<dyn CartSurface>,
    notifier: Arc<dyn Notifier>,
    checkout_delay: Duration,
}

impl CartManager {
    /// Create a manager, restoring any cart saved in `store`.
    ///
    /// Tracking, the surface and notifications start disabled; attach them
    /// with the `with_*` methods.
    #[must_use]
    pub fn new(store: Arc<dyn PersistenceStore>, currency_code: CurrencyCode) -> Self {
        let cart = persistence::rehydrate(store.as_ref(), currency_code);
        Self {
            cart,
            phase: CartPhase::Active,
            store,
            tracker: Tracker::disabled(),
            surface: Arc::new(NoopSurface),
            notifier: Arc::new(SilentNotifier),
            checkout_delay: DEFAULT_CHECKOUT_DELAY,
        }
    }

    /// Send tracking events through `tracker`.
    #[must_use]
    pub fn with_tracker(mut self, tracker: Tracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Show the cart on `surface`, rendering the current state immediately.
    #[must_use]
    pub fn with_surface(mut self, surface: Arc<dyn CartSurface>) -> Self {
        self.surface = surface;
        self.render();
        self
    }

    /// Deliver notifications to `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub const fn with_checkout_delay(mut self, delay: Duration) -> Self {
        self.checkout_delay = delay;
        self
    }

    /// Current cart snapshot.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn phase(&self) -> CartPhase {
        self.phase
    }

    #[must_use]
    pub const fn checkout_delay(&self) -> Duration {
        self.checkout_delay
    }

    /// Add a line item and return its ID.
    ///
    /// `price` must be non-negative and in the cart's currency.
    pub fn add_item(&mut self, name: impl Into<String>, price: Price) -> CartItemId {
        debug_assert!(price.is_non_negative(), "cart prices must be non-negative");
        debug_assert_eq!(price.currency_code, self.cart.total().currency_code);

        let item = CartItem::new(name, price);
        let id = item.id;
        let name = item.name.clone();
        self.cart = std::mem::take(&mut self.cart).with_item(item);

        tracing::info!(
            item_id = %id,
            name = %name,
            price = %price,
            total = %self.cart.total(),
            items = self.cart.len(),
            "Added item to cart"
        );
        add_breadcrumb("cart", "Added item", Some(&[("name", name.as_str())]));

        self.persist();
        self.render();
        self.tracker.record(&TrackingEvent::AddToCart {
            name: name.clone(),
            price,
            cart_total: self.cart.total(),
            item_count: self.cart.len(),
        });
        self.notify(Notification::toast(format!("{name} added to cart!")));
        id
    }

    /// Remove the line item with `id`.
    ///
    /// An unknown ID changes nothing and produces no output.
    pub fn remove_item(&mut self, id: CartItemId) -> Option<CartItem> {
        let (cart, removed) = std::mem::take(&mut self.cart).without_item(id);
        self.cart = cart;

        let Some(removed) = removed else {
            tracing::debug!(item_id = %id, "Remove ignored, item not in cart");
            return None;
        };

        tracing::info!(
            item_id = %id,
            name = %removed.name,
            total = %self.cart.total(),
            items = self.cart.len(),
            "Removed item from cart"
        );
        add_breadcrumb(
            "cart",
            "Removed item",
            Some(&[("name", removed.name.as_str())]),
        );

        self.persist();
        self.render();
        self.tracker.record(&TrackingEvent::RemoveFromCart {
            name: removed.name.clone(),
            price: removed.unit_price,
            cart_total: self.cart.total(),
            item_count: self.cart.len(),
        });
        self.notify(Notification::toast(format!(
            "{} removed from cart",
            removed.name
        )));
        Some(removed)
    }

    /// Record that the shopper opened the cart view and refresh it.
    pub fn view_cart(&self) {
        self.render();
        self.tracker.record(&TrackingEvent::CartViewed {
            cart_total: self.cart.total(),
            item_count: self.cart.len(),
        });
    }

    /// Start checking out.
    ///
    /// On a non-empty cart this records the checkout-started events and moves
    /// to [`CartPhase::CheckingOut`]. The caller finishes the purchase by
    /// passing the returned [`PendingCheckout`] to
    /// [`complete_checkout`](Self::complete_checkout) after its delay; if that
    /// never happens, the cart simply stays as it is.
    pub fn begin_checkout(&mut self) -> CheckoutStart {
        if self.cart.is_empty() {
            tracing::debug!("Checkout requested on empty cart");
            self.notify(Notification::toast("Your cart is empty!"));
            return CheckoutStart::EmptyCart;
        }
        if self.phase.is_checking_out() {
            tracing::debug!("Checkout requested while one is pending");
            self.notify(Notification::toast("Checkout already in progress"));
            return CheckoutStart::AlreadyInProgress;
        }

        self.phase = CartPhase::CheckingOut;
        let pending = PendingCheckout {
            delay: self.checkout_delay,
            total: self.cart.total(),
            item_count: self.cart.len(),
        };

        tracing::info!(
            total = %pending.total,
            items = pending.item_count,
            "Checkout started"
        );
        add_breadcrumb("checkout", "Checkout started", None);

        self.tracker.record(&TrackingEvent::InitiateCheckout {
            cart_total: pending.total,
            item_count: pending.item_count,
            item_names: self.cart.item_names(),
        });
        self.notify(Notification::toast("Proceeding to checkout..."));
        CheckoutStart::Started(pending)
    }

    /// Finish a checkout started by [`begin_checkout`](Self::begin_checkout).
    ///
    /// The purchase covers the cart as it is now, which may differ from the
    /// snapshot in `pending` if items changed during the delay. When the cart
    /// has been emptied in the meantime nothing is purchased and `None` is
    /// returned.
    pub fn complete_checkout(&mut self, pending: &PendingCheckout) -> Option<Receipt> {
        self.phase = CartPhase::Active;

        if self.cart.is_empty() {
            tracing::info!(
                started_total = %pending.total,
                "Cart emptied during checkout, nothing purchased"
            );
            return None;
        }

        let receipt = Receipt {
            total: self.cart.total(),
            item_count: self.cart.len(),
            item_names: self.cart.item_names(),
        };
        if receipt.total != pending.total || receipt.item_count != pending.item_count {
            tracing::info!(
                started_total = %pending.total,
                final_total = %receipt.total,
                "Cart changed during checkout"
            );
        }

        self.tracker.record(&TrackingEvent::Purchase {
            cart_total: receipt.total,
            item_count: receipt.item_count,
        });
        self.notify(Notification::confirmation(format!(
            "Thank you for your purchase! Total: {}",
            receipt.total
        )));

        self.cart = std::mem::take(&mut self.cart).cleared();
        if let Err(e) = persistence::clear(self.store.as_ref()) {
            let _ = e.reported();
        }
        self.render();

        tracing::info!(
            total = %receipt.total,
            items = receipt.item_count,
            "Purchase completed"
        );
        add_breadcrumb("checkout", "Purchase completed", None);
        Some(receipt)
    }

    /// Project the cart onto the surface.
    pub fn render(&self) {
        self.surface.show(&CartView::from(&self.cart));
    }

    fn persist(&self) {
        if let Err(e) = persistence::persist(self.store.as_ref(), &self.cart) {
            let _ = e.reported();
        }
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("cart", &self.cart)
            .field("phase", &self.phase)
            .field("checkout_delay", &self.checkout_delay)
            .finish_non_exhaustive()
    }
}
