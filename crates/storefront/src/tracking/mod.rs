//! Analytics events for the tracking pixel.
//!
//! Storefront code describes what happened as a [`TrackingEvent`]. Each event
//! expands into one or two [`PixelCall`]s: a standard pixel event (`track`)
//! where the pixel defines one, plus a custom event (`trackCustom`) carrying
//! storefront-specific fields. Calls are handed to a [`TrackingSink`].
//!
//! Tracking is best-effort. [`Tracker::record`] logs and drops sink
//! failures so analytics never affects cart behavior.

pub mod sinks;

use std::fmt;
use std::sync::Arc;

use bespoke_baby_core::{Email, Price};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

pub use sinks::{JsonlSink, LogSink, MemorySink, NoopSink};

/// Errors a sink may report. They are never surfaced to shoppers.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Transport for the pixel failed.
    #[error("Pixel transport failed: {0}")]
    Transport(#[from] std::io::Error),

    /// The call could not be encoded.
    #[error("Failed to encode pixel call: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Which pixel entry point a call goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelMethod {
    /// Standard event, `fbq('track', ...)`.
    #[serde(rename = "track")]
    Track,
    /// Custom event, `fbq('trackCustom', ...)`.
    #[serde(rename = "trackCustom")]
    TrackCustom,
}

impl fmt::Display for PixelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Track => write!(f, "track"),
            Self::TrackCustom => write!(f, "trackCustom"),
        }
    }
}

/// One call to the pixel: method, event name, flat parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelCall {
    pub method: PixelMethod,
    pub event: String,
    pub params: Map<String, Value>,
}

impl PixelCall {
    fn standard(event: &str, params: Value) -> Self {
        Self::build(PixelMethod::Track, event, params)
    }

    fn custom(event: &str, params: Value) -> Self {
        Self::build(PixelMethod::TrackCustom, event, params)
    }

    fn build(method: PixelMethod, event: &str, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            method,
            event: event.to_string(),
            params,
        }
    }
}

/// Something worth telling the pixel about.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    /// An item was added; totals are after the add.
    AddToCart {
        name: String,
        price: Price,
        cart_total: Price,
        item_count: usize,
    },
    /// An item was removed; totals are after the removal.
    RemoveFromCart {
        name: String,
        price: Price,
        cart_total: Price,
        item_count: usize,
    },
    /// The cart view was opened.
    CartViewed { cart_total: Price, item_count: usize },
    /// Checkout started on a non-empty cart.
    InitiateCheckout {
        cart_total: Price,
        item_count: usize,
        item_names: String,
    },
    /// The simulated purchase finished.
    Purchase { cart_total: Price, item_count: usize },
    /// A feature card was clicked.
    FeatureEngagement { feature: String },
    /// A category tile was clicked.
    CategoryExploration { category: String },
    /// The newsletter form was submitted.
    NewsletterSignup { email: Email },
    /// The contact form was submitted.
    ContactFormSubmitted { subject: String, has_phone: bool },
    /// The pointer entered a product card.
    ProductHover { product: String },
    /// The page finished loading.
    PageView {
        user_agent: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// The reader scrolled past a depth threshold (percent).
    ScrollDepth { percent: u8 },
    /// The reader stayed on the page for a dwell threshold.
    EngagementTime { label: &'static str },
}

impl TrackingEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart { .. } => "AddToCart",
            Self::RemoveFromCart { .. } => "RemoveFromCart",
            Self::CartViewed { .. } => "CartViewed",
            Self::InitiateCheckout { .. } => "InitiateCheckout",
            Self::Purchase { .. } => "Purchase",
            Self::FeatureEngagement { .. } => "FeatureEngagement",
            Self::CategoryExploration { .. } => "CategoryExploration",
            Self::NewsletterSignup { .. } => "NewsletterSignup",
            Self::ContactFormSubmitted { .. } => "ContactFormSubmitted",
            Self::ProductHover { .. } => "ProductHover",
            Self::PageView { .. } => "PageView",
            Self::ScrollDepth { .. } => "ScrollDepth",
            Self::EngagementTime { .. } => "EngagementTime",
        }
    }

    /// Expand into the pixel calls to send, standard event first.
    #[must_use]
    pub fn pixel_calls(&self) -> Vec<PixelCall> {
        match self {
            Self::AddToCart {
                name,
                price,
                cart_total,
                item_count,
            } => vec![
                PixelCall::standard(
                    "AddToCart",
                    json!({
                        "content_name": name,
                        "value": price.amount_f64(),
                        "currency": price.currency_code.code(),
                        "content_type": "product",
                    }),
                ),
                PixelCall::custom(
                    "AddToCartCustom",
                    json!({
                        "product_name": name,
                        "product_price": price.amount_f64(),
                        "cart_total": cart_total.amount_f64(),
                        "item_count": item_count,
                    }),
                ),
            ],
            Self::RemoveFromCart {
                name,
                price,
                cart_total,
                item_count,
            } => vec![PixelCall::custom(
                "RemoveFromCart",
                json!({
                    "product_name": name,
                    "product_price": price.amount_f64(),
                    "cart_total": cart_total.amount_f64(),
                    "item_count": item_count,
                }),
            )],
            Self::CartViewed {
                cart_total,
                item_count,
            } => vec![PixelCall::custom(
                "CartViewed",
                json!({
                    "item_count": item_count,
                    "cart_value": cart_total.amount_f64(),
                }),
            )],
            Self::InitiateCheckout {
                cart_total,
                item_count,
                item_names,
            } => vec![
                PixelCall::standard(
                    "InitiateCheckout",
                    json!({
                        "value": cart_total.amount_f64(),
                        "currency": cart_total.currency_code.code(),
                        "num_items": item_count,
                    }),
                ),
                PixelCall::custom(
                    "CheckoutStarted",
                    json!({
                        "cart_total": cart_total.amount_f64(),
                        "item_count": item_count,
                        "items": item_names,
                    }),
                ),
            ],
            Self::Purchase {
                cart_total,
                item_count,
            } => vec![
                PixelCall::standard(
                    "Purchase",
                    json!({
                        "value": cart_total.amount_f64(),
                        "currency": cart_total.currency_code.code(),
                        "num_items": item_count,
                    }),
                ),
                PixelCall::custom(
                    "PurchaseComplete",
                    json!({
                        "transaction_value": cart_total.amount_f64(),
                        "item_count": item_count,
                        "payment_method": "demo",
                    }),
                ),
            ],
            Self::FeatureEngagement { feature } => vec![PixelCall::custom(
                "FeatureEngagement",
                json!({
                    "content_type": "feature",
                    "feature_name": feature,
                    "page_location": "homepage",
                }),
            )],
            Self::CategoryExploration { category } => vec![PixelCall::custom(
                "CategoryExploration",
                json!({
                    "content_category": category,
                    "user_intent": "browsing",
                    "page_location": "homepage",
                }),
            )],
            Self::NewsletterSignup { email } => vec![
                PixelCall::custom(
                    "NewsletterSignup",
                    json!({
                        "lead_source": "homepage_footer",
                        "user_email": email.as_str(),
                    }),
                ),
                PixelCall::standard(
                    "Lead",
                    json!({ "content_name": "Newsletter Subscription" }),
                ),
            ],
            Self::ContactFormSubmitted { subject, has_phone } => vec![
                PixelCall::custom(
                    "ContactFormSubmitted",
                    json!({
                        "subject": subject,
                        "has_phone": has_phone,
                    }),
                ),
                PixelCall::standard("Contact", json!({ "content_name": "Contact Form" })),
            ],
            Self::ProductHover { product } => vec![PixelCall::custom(
                "ProductHover",
                json!({
                    "content_name": product,
                    "content_type": "product",
                }),
            )],
            Self::PageView {
                user_agent,
                timestamp,
            } => vec![PixelCall::custom(
                "PageViewDetailed",
                json!({
                    "page_type": "homepage",
                    "user_agent": user_agent,
                    "timestamp": timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                }),
            )],
            Self::ScrollDepth { percent } => vec![PixelCall::custom(
                "ScrollDepth",
                json!({ "depth": format!("{percent}%") }),
            )],
            Self::EngagementTime { label } => vec![PixelCall::custom(
                "EngagementTime",
                json!({ "duration": label }),
            )],
        }
    }
}

/// Receiver of pixel calls.
///
/// Implementations should return quickly; there is no response contract.
pub trait TrackingSink: Send + Sync {
    /// Deliver one call.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError` if delivery failed. Callers drop the error.
    fn emit(&self, call: &PixelCall) -> Result<(), TrackingError>;
}

/// Shared handle that expands events and feeds them to a sink.
#[derive(Clone)]
pub struct Tracker {
    sink: Arc<dyn TrackingSink>,
}

impl Tracker {
    #[must_use]
    pub fn new(sink: Arc<dyn TrackingSink>) -> Self {
        Self { sink }
    }

    /// A tracker that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopSink))
    }

    /// Send every pixel call for `event`, swallowing failures.
    pub fn record(&self, event: &TrackingEvent) {
        for call in event.pixel_calls() {
            match self.sink.emit(&call) {
                Ok(()) => tracing::debug!(
                    method = %call.method,
                    event = %call.event,
                    "Tracked pixel event"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    event = %call.event,
                    "Dropping pixel event"
                ),
            }
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker").finish_non_exhaustive()
    }
}
