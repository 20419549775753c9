//! Cart commands.

use bespoke_baby_core::{CartItemId, Price};
use bespoke_baby_storefront::view::CartFragments;
use bespoke_baby_storefront::{Checkout, Storefront};
use rust_decimal::Decimal;

use super::CommandError;
use crate::terminal::TerminalSurface;

/// Add one item at `amount` in the configured currency.
pub async fn add(storefront: &Storefront, name: &str, amount: Decimal) -> Result<(), CommandError> {
    let price = Price::new(amount, storefront.config().currency);
    if !price.is_non_negative() {
        return Err(CommandError::NegativePrice(amount));
    }
    let id = storefront.add_item(name, price).await;
    tracing::debug!(item_id = %id, "Added");
    Ok(())
}

/// Remove one line item. An ID not in the cart is ignored.
pub async fn remove(storefront: &Storefront, id: CartItemId) {
    if storefront.remove_item(id).await.is_none() {
        tracing::debug!(item_id = %id, "Nothing to remove");
    }
}

/// Open the cart view and print it.
#[allow(clippy::print_stdout)]
pub async fn show(
    storefront: &Storefront,
    surface: &TerminalSurface,
    html: bool,
) -> Result<(), CommandError> {
    storefront.view_cart().await;

    if html {
        let fragments = CartFragments::render(&surface.latest())?;
        println!("{}", fragments.count_badge);
        println!("{}", fragments.items);
        println!("{}", fragments.total);
    } else {
        surface.print();
    }
    Ok(())
}

/// Start a checkout and wait for it to finish.
#[allow(clippy::print_stdout)]
pub async fn checkout(storefront: &Storefront) {
    match storefront.checkout().await {
        Checkout::Scheduled(scheduled) => match scheduled.wait().await {
            Some(receipt) => println!("Purchased {} item(s): {}", receipt.item_count, receipt.item_names),
            None => println!("Nothing was purchased"),
        },
        Checkout::EmptyCart | Checkout::AlreadyInProgress => {}
    }
}
