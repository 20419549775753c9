//! Unified error handling with Sentry integration.
//!
//! Cart operations themselves are total; errors only surface at the I/O and
//! configuration boundaries. `StorefrontError` collects those so callers can
//! use one `Result` type.

use bespoke_baby_core::EmailError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::tracking::TrackingError;

/// Library-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Tracking sink rejected an event.
    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    /// Cart state could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A view template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Invalid input from the user.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl StorefrontError {
    /// Report the error to Sentry and the log, returning it unchanged.
    ///
    /// Input mistakes are logged but not sent to Sentry.
    #[must_use]
    pub fn reported(self) -> Self {
        if matches!(self, Self::InvalidEmail(_)) {
            tracing::info!(error = %self, "Rejected user input");
        } else {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
        self
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("name", "Onesie")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorefrontError::from(StoreError::Poisoned);
        assert_eq!(err.to_string(), "Store error: Store lock poisoned");

        let err = StorefrontError::from(EmailError::Empty);
        assert_eq!(err.to_string(), "Invalid email: email cannot be empty");
    }

    #[test]
    fn test_reported_returns_same_error() {
        let err = StorefrontError::from(ConfigError::InvalidEnvVar("X".to_string(), "bad".to_string())).reported();
        assert!(matches!(err, StorefrontError::Config(_)));
    }

    #[test]
    fn test_breadcrumb_without_sentry_client_is_noop() {
        add_breadcrumb("cart", "Added item", Some(&[("name", "Onesie")]));
        add_breadcrumb("cart", "Viewed cart", None);
    }
}
