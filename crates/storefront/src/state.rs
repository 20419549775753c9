//! Storefront state shared across UI triggers and timers.
//!
//! [`Storefront`] is the one handle the outside world talks to. It owns the
//! single [`CartManager`] behind an async mutex, so every trigger and every
//! timer callback is applied in arrival order with no interleaving inside an
//! operation. The checkout delay runs as a spawned task holding a clone of
//! the handle.

use std::sync::Arc;

use bespoke_baby_core::{CartItemId, CartPhase, Email, Price};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::cart::{Cart, CartItem, CartManager, CheckoutStart, Receipt};
use crate::config::StorefrontConfig;
use crate::engagement::{DwellTimeObserver, ScrollDepthObserver};
use crate::error::{Result, StorefrontError};
use crate::notifications::{Notification, Notifier};
use crate::store::{FileStore, PersistenceStore};
use crate::tracking::{JsonlSink, LogSink, NoopSink, Tracker, TrackingEvent, TrackingSink};
use crate::view::CartSurface;

/// External collaborators a storefront is wired to.
pub struct Collaborators {
    pub store: Arc<dyn PersistenceStore>,
    pub sink: Arc<dyn TrackingSink>,
    pub surface: Arc<dyn CartSurface>,
    pub notifier: Arc<dyn Notifier>,
}

/// Outcome of [`Storefront::checkout`].
#[derive(Debug)]
#[must_use]
pub enum Checkout {
    /// Nothing to buy.
    EmptyCart,
    /// Another checkout is still waiting on its delay.
    AlreadyInProgress,
    /// Completion is scheduled.
    Scheduled(ScheduledCheckout),
}

/// A checkout whose completion step is running on a timer.
#[derive(Debug)]
pub struct ScheduledCheckout {
    handle: JoinHandle<Option<Receipt>>,
}

impl ScheduledCheckout {
    /// Wait for the purchase to complete.
    ///
    /// Returns `None` if the cart was emptied during the delay.
    pub async fn wait(self) -> Option<Receipt> {
        self.handle.await.ok().flatten()
    }
}

/// Application state shared across all triggers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    cart: Mutex<CartManager>,
    tracker: Tracker,
    notifier: Arc<dyn Notifier>,
    scroll: Mutex<ScrollDepthObserver>,
}

impl Storefront {
    /// Create a storefront from explicit collaborators.
    ///
    /// The cart is restored from `collaborators.store` and rendered once.
    #[must_use]
    pub fn new(config: StorefrontConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            store,
            sink,
            surface,
            notifier,
        } = collaborators;
        let tracker = Tracker::new(sink);

        let manager = CartManager::new(store, config.currency)
            .with_tracker(tracker.clone())
            .with_notifier(notifier.clone())
            .with_checkout_delay(config.checkout_delay)
            .with_surface(surface);

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                cart: Mutex::new(manager),
                tracker,
                notifier,
                scroll: Mutex::new(ScrollDepthObserver::new()),
            }),
        }
    }

    /// Create a storefront backed by the local file store in
    /// `config.data_dir`.
    ///
    /// Pixel calls go to the local outbox when a pixel is configured. Without
    /// one they are written to the debug log if debug logging is on, and
    /// dropped otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file or the pixel outbox cannot be opened.
    pub fn open(
        config: StorefrontConfig,
        surface: Arc<dyn CartSurface>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let store = Arc::new(FileStore::open(&config.data_dir)?);
        let sink: Arc<dyn TrackingSink> = match &config.analytics.meta_pixel_id {
            Some(pixel_id) => {
                let sink = JsonlSink::open(&config.data_dir, pixel_id.clone())?;
                tracing::info!(path = %sink.path().display(), "Pixel tracking enabled");
                Arc::new(sink)
            }
            None if tracing::enabled!(tracing::Level::DEBUG) => {
                tracing::info!("No pixel configured, logging pixel calls");
                Arc::new(LogSink)
            }
            None => {
                tracing::info!("No pixel configured, tracking disabled");
                Arc::new(NoopSink)
            }
        };

        Ok(Self::new(
            config,
            Collaborators {
                store,
                sink,
                surface,
                notifier,
            },
        ))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Snapshot of the current cart.
    pub async fn cart(&self) -> Cart {
        self.inner.cart.lock().await.cart().clone()
    }

    pub async fn phase(&self) -> CartPhase {
        self.inner.cart.lock().await.phase()
    }

    /// "Add to cart" trigger.
    #[instrument(skip(self))]
    pub async fn add_item(&self, name: &str, price: Price) -> CartItemId {
        self.inner.cart.lock().await.add_item(name, price)
    }

    /// "Remove item" trigger.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: CartItemId) -> Option<CartItem> {
        self.inner.cart.lock().await.remove_item(id)
    }

    /// "Open cart view" trigger.
    #[instrument(skip(self))]
    pub async fn view_cart(&self) {
        self.inner.cart.lock().await.view_cart();
    }

    /// "Checkout" trigger.
    ///
    /// On a non-empty cart the completion step is spawned on the runtime and
    /// runs after the configured delay even if the returned handle is dropped.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Checkout {
        let start = self.inner.cart.lock().await.begin_checkout();
        match start {
            CheckoutStart::EmptyCart => Checkout::EmptyCart,
            CheckoutStart::AlreadyInProgress => Checkout::AlreadyInProgress,
            CheckoutStart::Started(pending) => {
                let storefront = self.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(pending.delay).await;
                    storefront
                        .inner
                        .cart
                        .lock()
                        .await
                        .complete_checkout(&pending)
                });
                Checkout::Scheduled(ScheduledCheckout { handle })
            }
        }
    }

    /// A feature card was clicked.
    #[instrument(skip(self))]
    pub fn feature_clicked(&self, feature: &str) {
        self.inner.tracker.record(&TrackingEvent::FeatureEngagement {
            feature: feature.to_string(),
        });
        self.notify(format!(
            "Learning more about {}...",
            feature.replace('_', " ")
        ));
    }

    /// A category tile was clicked.
    #[instrument(skip(self))]
    pub fn category_clicked(&self, category: &str) {
        self.inner.tracker.record(&TrackingEvent::CategoryExploration {
            category: category.to_string(),
        });
        self.notify(format!("Browsing {category} category..."));
    }

    /// The pointer entered a product card.
    pub fn product_hovered(&self, product: &str) {
        self.inner.tracker.record(&TrackingEvent::ProductHover {
            product: product.to_string(),
        });
    }

    /// The newsletter form was submitted.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::InvalidEmail` if the address is malformed;
    /// nothing is tracked in that case.
    #[instrument(skip(self, email))]
    pub fn subscribe_newsletter(&self, email: &str) -> Result<Email> {
        let email = Email::parse(email).map_err(StorefrontError::from)?;
        self.inner.tracker.record(&TrackingEvent::NewsletterSignup {
            email: email.clone(),
        });
        tracing::info!(domain = %email.domain(), "Newsletter signup");
        self.notify("Thank you for subscribing!".to_string());
        Ok(email)
    }

    /// The contact form was submitted.
    ///
    /// Only the subject and whether a phone number was given are tracked.
    #[instrument(skip(self, phone))]
    pub fn contact_submitted(&self, subject: &str, phone: Option<&str>) {
        let has_phone = phone.is_some_and(|p| !p.is_empty());
        self.inner.tracker.record(&TrackingEvent::ContactFormSubmitted {
            subject: subject.to_string(),
            has_phone,
        });
        self.notify("Thank you! We will get back to you soon.".to_string());
    }

    /// The page finished loading.
    pub fn page_loaded(&self, user_agent: &str) {
        self.inner.tracker.record(&TrackingEvent::PageView {
            user_agent: user_agent.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }

    /// The page scrolled.
    pub async fn scrolled(&self, scroll_y: f64, document_height: f64, viewport_height: f64) {
        self.inner.scroll.lock().await.observe_and_track(
            &self.inner.tracker,
            scroll_y,
            document_height,
            viewport_height,
        );
    }

    /// Start the dwell-time timer. Must be called within a tokio runtime.
    #[must_use]
    pub fn start_dwell_tracking(&self) -> JoinHandle<()> {
        DwellTimeObserver::spawn(self.inner.tracker.clone())
    }

    fn notify(&self, message: String) {
        self.inner.notifier.notify(Notification::toast(message));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use bespoke_baby_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::notifications::NotificationCenter;
    use crate::store::MemoryStore;
    use crate::tracking::MemorySink;
    use crate::view::HtmlSurface;

    struct Fixture {
        storefront: Storefront,
        sink: Arc<MemorySink>,
        notices: Arc<NotificationCenter>,
    }

    fn fixture() -> Fixture {
        let sink = Arc::new(MemorySink::new());
        let notices = Arc::new(NotificationCenter::new(Duration::from_secs(3_600)));
        let storefront = Storefront::new(
            StorefrontConfig::default(),
            Collaborators {
                store: Arc::new(MemoryStore::new()),
                sink: sink.clone(),
                surface: Arc::new(HtmlSurface::new()),
                notifier: notices.clone(),
            },
        );
        Fixture {
            storefront,
            sink,
            notices,
        }
    }

    fn ugx(amount: i64) -> Price {
        Price::ugx(Decimal::from(amount))
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_completes_after_delay() {
        let f = fixture();
        f.storefront.add_item("Onesie", ugx(25_000)).await;

        let Checkout::Scheduled(scheduled) = f.storefront.checkout().await else {
            panic!("checkout should be scheduled");
        };
        assert_eq!(f.storefront.phase().await, CartPhase::CheckingOut);

        tokio::time::sleep(Duration::from_millis(1_499)).await;
        assert_eq!(f.sink.count("Purchase"), 0);
        assert_eq!(f.storefront.cart().await.len(), 1);

        let receipt = scheduled.wait().await.unwrap();
        assert_eq!(receipt.total, ugx(25_000));
        assert!(f.storefront.cart().await.is_empty());
        assert_eq!(f.storefront.phase().await, CartPhase::Active);
        assert_eq!(f.sink.count("Purchase"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_empty_cart() {
        let f = fixture();
        assert!(matches!(f.storefront.checkout().await, Checkout::EmptyCart));
        assert!(f.sink.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_still_completes() {
        let f = fixture();
        f.storefront.add_item("Bib", ugx(8_000)).await;
        drop(f.storefront.checkout().await);

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(f.storefront.cart().await.is_empty());
        assert_eq!(f.sink.count("PurchaseComplete"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_during_delay_is_applied_first() {
        let f = fixture();
        let bib = f.storefront.add_item("Bib", ugx(8_000)).await;
        f.storefront.add_item("Hat", ugx(20)).await;
        let Checkout::Scheduled(scheduled) = f.storefront.checkout().await else {
            panic!("checkout should be scheduled");
        };

        f.storefront.remove_item(bib).await;
        let receipt = scheduled.wait().await.unwrap();

        assert_eq!(receipt.total, ugx(20));
    }

    #[tokio::test]
    async fn test_newsletter_valid_and_invalid() {
        let f = fixture();

        assert!(f.storefront.subscribe_newsletter("nope").is_err());
        assert!(f.sink.calls().is_empty());

        let email = f.storefront.subscribe_newsletter("parent@example.com").unwrap();
        assert_eq!(email.as_str(), "parent@example.com");
        assert_eq!(f.sink.event_names(), ["NewsletterSignup", "Lead"]);
        assert_eq!(f.notices.messages(), ["Thank you for subscribing!"]);
    }

    #[tokio::test]
    async fn test_feature_and_category_clicks() {
        let f = fixture();

        f.storefront.feature_clicked("organic_cotton");
        f.storefront.category_clicked("newborn");

        assert_eq!(
            f.sink.event_names(),
            ["FeatureEngagement", "CategoryExploration"]
        );
        assert_eq!(f.notices.messages(), ["Browsing newborn category..."]);
    }

    #[tokio::test]
    async fn test_contact_form_tracks_and_thanks() {
        let f = fixture();

        f.storefront.contact_submitted("Sizing question", Some("+256 700 000000"));

        let calls = f.sink.calls();
        assert_eq!(f.sink.event_names(), ["ContactFormSubmitted", "Contact"]);
        assert_eq!(calls[0].params["subject"], "Sizing question");
        assert_eq!(calls[0].params["has_phone"], true);
        assert_eq!(calls[1].params["content_name"], "Contact Form");
        assert_eq!(
            f.notices.messages(),
            ["Thank you! We will get back to you soon."]
        );
    }

    #[tokio::test]
    async fn test_contact_form_empty_phone() {
        let f = fixture();

        f.storefront.contact_submitted("Returns", Some(""));
        f.storefront.contact_submitted("Returns", None);

        let calls = f.sink.calls();
        assert_eq!(calls[0].params["has_phone"], false);
        assert_eq!(calls[2].params["has_phone"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_notification_ttl() {
        let config = StorefrontConfig {
            notification_ttl: Duration::from_millis(500),
            ..StorefrontConfig::default()
        };
        let notices = Arc::new(NotificationCenter::from_config(&config));
        let storefront = Storefront::new(
            config,
            Collaborators {
                store: Arc::new(MemoryStore::new()),
                sink: Arc::new(MemorySink::new()),
                surface: Arc::new(HtmlSurface::new()),
                notifier: notices.clone(),
            },
        );

        storefront.add_item("Bib", ugx(8_000)).await;
        assert_eq!(notices.messages(), ["Bib added to cart!"]);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(notices.messages().is_empty());
    }

    #[tokio::test]
    async fn test_page_load_and_hover() {
        let f = fixture();

        f.storefront.page_loaded("Mozilla/5.0");
        f.storefront.product_hovered("Bamboo Bib");

        let calls = f.sink.calls();
        assert_eq!(f.sink.event_names(), ["PageViewDetailed", "ProductHover"]);
        assert_eq!(calls[0].params["user_agent"], "Mozilla/5.0");
        assert_eq!(calls[1].params["content_name"], "Bamboo Bib");
        assert!(f.notices.messages().is_empty());
    }

    #[tokio::test]
    async fn test_scroll_is_tracked_once_per_threshold() {
        let f = fixture();

        f.storefront.scrolled(1_000.0, 2_000.0, 1_000.0).await;
        f.storefront.scrolled(1_000.0, 2_000.0, 1_000.0).await;

        assert_eq!(f.sink.count("ScrollDepth"), 4);
    }

    #[tokio::test]
    async fn test_open_with_file_store_and_pixel() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            currency: CurrencyCode::UGX,
            ..StorefrontConfig::default()
        };
        config.analytics.meta_pixel_id = Some("1234567890".to_string());

        let storefront = Storefront::open(
            config.clone(),
            Arc::new(HtmlSurface::new()),
            Arc::new(NotificationCenter::default()),
        )
        .unwrap();
        storefront.add_item("Onesie", ugx(25_000)).await;
        drop(storefront);

        let reopened = Storefront::open(
            config,
            Arc::new(HtmlSurface::new()),
            Arc::new(NotificationCenter::default()),
        )
        .unwrap();
        assert_eq!(reopened.cart().await.total(), ugx(25_000));
        assert!(dir.path().join(JsonlSink::FILE_NAME).exists());
    }
}
