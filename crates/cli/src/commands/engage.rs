//! Engagement commands.

use bespoke_baby_storefront::Storefront;

use super::CommandError;

/// Submit the newsletter form.
pub fn subscribe(storefront: &Storefront, email: &str) -> Result<(), CommandError> {
    storefront
        .subscribe_newsletter(email)
        .map_err(bespoke_baby_storefront::StorefrontError::reported)?;
    Ok(())
}

pub fn feature(storefront: &Storefront, name: &str) {
    storefront.feature_clicked(name);
}

pub fn category(storefront: &Storefront, name: &str) {
    storefront.category_clicked(name);
}

pub fn hover(storefront: &Storefront, product: &str) {
    storefront.product_hovered(product);
}

/// Submit the contact form.
pub fn contact(storefront: &Storefront, subject: &str, phone: Option<&str>) {
    storefront.contact_submitted(subject, phone);
}
