//! Terminal implementations of the storefront's output surfaces.

use std::sync::RwLock;

use bespoke_baby_core::CurrencyCode;
use bespoke_baby_storefront::notifications::{NotificationCenter, NotificationKind};
use bespoke_baby_storefront::view::{CartSurface, CartView};

/// Keeps the latest cart view for printing on demand.
///
/// The storefront re-renders after every change; printing each of those
/// would repeat the cart several times per command.
#[derive(Debug)]
pub struct TerminalSurface {
    currency: CurrencyCode,
    latest: RwLock<Option<CartView>>,
}

impl TerminalSurface {
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            currency,
            latest: RwLock::new(None),
        }
    }

    /// The most recently shown view.
    pub fn latest(&self) -> CartView {
        self.latest
            .read()
            .ok()
            .and_then(|view| view.clone())
            .unwrap_or_else(|| CartView::empty(self.currency))
    }

    /// Print the most recently shown view as a table.
    #[allow(clippy::print_stdout)]
    pub fn print(&self) {
        let view = self.latest();
        if view.items.is_empty() {
            println!("Your cart is empty");
        } else {
            for item in &view.items {
                println!("{}  {:<32} {:>12}", item.id, item.name, item.price);
            }
        }
        println!("Items: {}  Total: {}", view.item_count, view.subtotal);
    }
}

impl CartSurface for TerminalSurface {
    fn show(&self, view: &CartView) {
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(view.clone());
        }
    }
}

/// Lines for the notifications still on screen, oldest first.
pub fn notification_lines(center: &NotificationCenter) -> Vec<String> {
    center
        .visible()
        .into_iter()
        .map(|notification| match notification.kind {
            NotificationKind::Toast => format!("> {}", notification.message),
            NotificationKind::Confirmation => format!("* {}", notification.message),
        })
        .collect()
}

/// Print the notifications still on screen when a command finishes.
#[allow(clippy::print_stdout)]
pub fn print_notifications(center: &NotificationCenter) {
    for line in notification_lines(center) {
        println!("{line}");
    }
}
