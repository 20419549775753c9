//! Cart and pixel outbox files surviving a restart.
//!
//! Each test opens a storefront on a temporary data directory, drops it, and
//! opens a fresh one on the same directory, the way successive CLI runs do.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use bespoke_baby_core::Price;
use bespoke_baby_storefront::notifications::SilentNotifier;
use bespoke_baby_storefront::store::FileStore;
use bespoke_baby_storefront::tracking::JsonlSink;
use bespoke_baby_storefront::view::NoopSurface;
use bespoke_baby_storefront::{Storefront, StorefrontConfig, StorefrontError};
use rust_decimal::Decimal;

fn config(data_dir: &Path, pixel_id: Option<&str>) -> StorefrontConfig {
    let mut config = StorefrontConfig {
        data_dir: data_dir.to_path_buf(),
        ..StorefrontConfig::default()
    };
    config.analytics.meta_pixel_id = pixel_id.map(str::to_string);
    config
}

fn open(config: StorefrontConfig) -> Result<Storefront, StorefrontError> {
    Storefront::open(config, Arc::new(NoopSurface), Arc::new(SilentNotifier))
}

fn ugx(amount: i64) -> Price {
    Price::ugx(Decimal::from(amount))
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let storefront = open(config(dir.path(), None)).unwrap();
    let onesie = storefront.add_item("Onesie", ugx(25_000)).await;
    storefront.add_item("Bib", ugx(8_000)).await;
    drop(storefront);

    let storefront = open(config(dir.path(), None)).unwrap();
    let cart = storefront.cart().await;
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total(), ugx(33_000));
    assert_eq!(cart.items()[0].id, onesie);
    assert_eq!(cart.items()[1].name, "Bib");

    storefront.remove_item(onesie).await.unwrap();
    drop(storefront);

    let storefront = open(config(dir.path(), None)).unwrap();
    assert_eq!(storefront.cart().await.total(), ugx(8_000));
}

#[tokio::test(start_paused = true)]
async fn test_completed_checkout_clears_storage() {
    let dir = tempfile::tempdir().unwrap();

    let storefront = open(config(dir.path(), None)).unwrap();
    storefront.add_item("Bib", ugx(8_000)).await;
    let bespoke_baby_storefront::Checkout::Scheduled(scheduled) = storefront.checkout().await
    else {
        panic!("checkout should be scheduled");
    };
    scheduled.wait().await.unwrap();
    drop(storefront);

    let storefront = open(config(dir.path(), None)).unwrap();
    assert!(storefront.cart().await.is_empty());
}

#[tokio::test]
async fn test_malformed_items_start_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(FileStore::FILE_NAME),
        r#"{"bespoke_baby.cart.items": "[{\"name\": 5}]", "bespoke_baby.cart.total": "5"}"#,
    )
    .unwrap();

    let storefront = open(config(dir.path(), None)).unwrap();
    let cart = storefront.cart().await;

    assert!(cart.is_empty());
    assert_eq!(cart.total(), ugx(0));
}

#[tokio::test]
async fn test_unparseable_store_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(FileStore::FILE_NAME),
        r#"{"bespoke_baby.cart.total": 5}"#,
    )
    .unwrap();

    let storefront = open(config(dir.path(), None)).unwrap();
    let cart = storefront.cart().await;
    assert!(cart.is_empty());
    assert_eq!(cart.total(), ugx(0));

    storefront.add_item("Bib", ugx(8_000)).await;
    drop(storefront);

    let storefront = open(config(dir.path(), None)).unwrap();
    assert_eq!(storefront.cart().await.total(), ugx(8_000));
    assert!(dir.path().join("local-storage.json.corrupt").exists());
}

#[tokio::test]
async fn test_pixel_outbox_records_calls() {
    let dir = tempfile::tempdir().unwrap();

    let storefront = open(config(dir.path(), Some("1234567890"))).unwrap();
    storefront.add_item("Onesie", ugx(25_000)).await;
    storefront.subscribe_newsletter("parent@example.com").unwrap();
    drop(storefront);

    let raw = fs::read_to_string(dir.path().join(JsonlSink::FILE_NAME)).unwrap();
    let lines: Vec<serde_json::Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let events: Vec<&str> = lines
        .iter()
        .map(|line| line["event"].as_str().unwrap())
        .collect();
    assert_eq!(events, ["AddToCart", "AddToCartCustom", "NewsletterSignup", "Lead"]);
    assert!(lines.iter().all(|line| line["pixel_id"] == "1234567890"));
    assert_eq!(lines[0]["method"], "track");
    assert_eq!(lines[1]["method"], "trackCustom");
    assert_eq!(lines[0]["params"]["value"], 25_000.0);
}

#[tokio::test]
async fn test_no_pixel_writes_no_outbox() {
    let dir = tempfile::tempdir().unwrap();

    let storefront = open(config(dir.path(), None)).unwrap();
    storefront.add_item("Onesie", ugx(25_000)).await;

    assert!(!dir.path().join(JsonlSink::FILE_NAME).exists());
}
