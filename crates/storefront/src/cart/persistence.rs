//! Save and restore carts through a [`PersistenceStore`].
//!
//! Two keys are used: the item list as a JSON array, and the total as decimal
//! text. The total is informational on load; the restored cart always derives
//! its total from the restored items.

use std::str::FromStr;

use bespoke_baby_core::CurrencyCode;
use rust_decimal::Decimal;

use super::{Cart, CartItem};
use crate::error::Result;
use crate::store::PersistenceStore;

/// Key holding the serialized item list.
pub const CART_ITEMS_KEY: &str = "bespoke_baby.cart.items";

/// Key holding the total as text.
pub const CART_TOTAL_KEY: &str = "bespoke_baby.cart.total";

/// Overwrite the stored cart with `cart`.
///
/// # Errors
///
/// Returns an error if the items cannot be encoded or the store rejects a write.
pub fn persist(store: &dyn PersistenceStore, cart: &Cart) -> Result<()> {
    let items = serde_json::to_string(cart.items())?;
    store.set(CART_ITEMS_KEY, &items)?;
    store.set(CART_TOTAL_KEY, &cart.total().amount.to_string())?;
    Ok(())
}

/// Remove both cart keys.
///
/// # Errors
///
/// Returns an error if the store rejects a write.
pub fn clear(store: &dyn PersistenceStore) -> Result<()> {
    store.remove(CART_ITEMS_KEY)?;
    store.remove(CART_TOTAL_KEY)?;
    Ok(())
}

/// Restore the stored cart.
///
/// Never fails: a missing, unreadable, or malformed item list yields an empty
/// cart, and the stored total is only compared against the derived one.
#[must_use]
pub fn rehydrate(store: &dyn PersistenceStore, currency_code: CurrencyCode) -> Cart {
    let raw_items = match store.get(CART_ITEMS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::empty(currency_code),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored cart, starting empty");
            return Cart::empty(currency_code);
        }
    };

    let items: Vec<CartItem> = match serde_json::from_str(&raw_items) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Stored cart is malformed, starting empty");
            return Cart::empty(currency_code);
        }
    };

    if items
        .iter()
        .any(|item| item.unit_price.currency_code != currency_code || !item.unit_price.is_non_negative())
    {
        tracing::warn!(
            currency = %currency_code,
            "Stored cart has foreign-currency or negative prices, starting empty"
        );
        return Cart::empty(currency_code);
    }

    let cart = Cart::from_items(items, currency_code);
    check_stored_total(store, &cart);
    tracing::info!(
        items = cart.len(),
        total = %cart.total(),
        "Rehydrated cart from store"
    );
    cart
}

fn check_stored_total(store: &dyn PersistenceStore, cart: &Cart) {
    let stored = store
        .get(CART_TOTAL_KEY)
        .ok()
        .flatten()
        .map(|raw| Decimal::from_str(raw.trim()));

    match stored {
        Some(Ok(total)) if total == cart.total().amount => {}
        Some(Ok(total)) => tracing::warn!(
            stored = %total,
            derived = %cart.total().amount,
            "Stored cart total disagrees with items, using derived total"
        ),
        Some(Err(e)) => tracing::warn!(error = %e, "Stored cart total is malformed, ignoring"),
        None => tracing::debug!("No stored cart total, using derived total"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bespoke_baby_core::Price;

    use super::*;
    use crate::store::MemoryStore;

    fn sample_cart() -> Cart {
        Cart::default()
            .with_item(CartItem::new("Onesie", Price::ugx(Decimal::from(25_000))))
            .with_item(CartItem::new("Bib", Price::ugx(Decimal::new(80_005, 1))))
    }

    #[test]
    fn test_persist_then_rehydrate_round_trip() {
        let store = MemoryStore::new();
        let cart = sample_cart();

        persist(&store, &cart).unwrap();
        let restored = rehydrate(&store, CurrencyCode::UGX);

        assert_eq!(restored, cart);
    }

    #[test]
    fn test_persist_writes_total_as_text() {
        let store = MemoryStore::new();
        persist(&store, &sample_cart()).unwrap();

        assert_eq!(
            store.get(CART_TOTAL_KEY).unwrap().as_deref(),
            Some("33000.5")
        );
    }

    #[test]
    fn test_rehydrate_missing_is_empty() {
        let store = MemoryStore::new();
        assert!(rehydrate(&store, CurrencyCode::UGX).is_empty());
    }

    #[test]
    fn test_rehydrate_malformed_items_fails_closed() {
        let store = MemoryStore::new();
        store.set(CART_ITEMS_KEY, "[{\"name\": 42}").unwrap();
        store.set(CART_TOTAL_KEY, "100").unwrap();

        let cart = rehydrate(&store, CurrencyCode::UGX);

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::zero(CurrencyCode::UGX));
    }

    #[test]
    fn test_rehydrate_ignores_disagreeing_total() {
        let store = MemoryStore::new();
        let cart = sample_cart();
        persist(&store, &cart).unwrap();
        store.set(CART_TOTAL_KEY, "1").unwrap();

        assert_eq!(rehydrate(&store, CurrencyCode::UGX).total(), cart.total());
    }

    #[test]
    fn test_rehydrate_ignores_malformed_total() {
        let store = MemoryStore::new();
        let cart = sample_cart();
        persist(&store, &cart).unwrap();
        store.set(CART_TOTAL_KEY, "lots").unwrap();

        assert_eq!(rehydrate(&store, CurrencyCode::UGX), cart);
    }

    #[test]
    fn test_rehydrate_rejects_negative_prices() {
        let store = MemoryStore::new();
        let cart = Cart::default().with_item(CartItem::new("Refund", Price::ugx(Decimal::from(-5))));
        persist(&store, &cart).unwrap();

        assert!(rehydrate(&store, CurrencyCode::UGX).is_empty());
    }

    #[test]
    fn test_rehydrate_rejects_foreign_currency() {
        let store = MemoryStore::new();
        persist(&store, &sample_cart()).unwrap();

        assert!(rehydrate(&store, CurrencyCode::USD).is_empty());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let store = MemoryStore::new();
        persist(&store, &sample_cart()).unwrap();

        clear(&store).unwrap();

        assert_eq!(store.get(CART_ITEMS_KEY).unwrap(), None);
        assert_eq!(store.get(CART_TOTAL_KEY).unwrap(), None);
    }
}
