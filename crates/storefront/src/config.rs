//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BESPOKE_DATA_DIR` - Directory for local storage and the pixel outbox (default: .bespoke-baby)
//! - `BESPOKE_CURRENCY` - Cart currency, ISO 4217 (default: UGX)
//! - `BESPOKE_CHECKOUT_DELAY_MS` - Pause before a checkout completes (default: 1500)
//! - `BESPOKE_NOTIFICATION_TTL_MS` - How long toasts stay visible (default: 3000)
//! - `META_PIXEL_ID` - Meta (Facebook) pixel ID; tracking is disabled when unset
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use bespoke_baby_core::CurrencyCode;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".bespoke-baby";
const DEFAULT_CHECKOUT_DELAY_MS: &str = "1500";
const DEFAULT_NOTIFICATION_TTL_MS: &str = "3000";

/// Longest delay accepted for either timer.
const MAX_DELAY_MS: u64 = 60_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Directory holding the local store file and pixel outbox
    pub data_dir: PathBuf,
    /// Currency all cart prices are in
    pub currency: CurrencyCode,
    /// Pause between starting and completing a checkout
    pub checkout_delay: Duration,
    /// How long toast notifications stay visible
    pub notification_ttl: Duration,
    /// Analytics tracking configuration
    pub analytics: AnalyticsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Analytics and tracking pixel configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsConfig {
    /// Meta (Facebook) pixel ID
    pub meta_pixel_id: Option<String>,
}

impl AnalyticsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let meta_pixel_id = get_optional_env("META_PIXEL_ID")
            .map(|id| parse_pixel_id("META_PIXEL_ID", &id))
            .transpose()?;
        Ok(Self { meta_pixel_id })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("BESPOKE_DATA_DIR", DEFAULT_DATA_DIR));
        let currency = parse_currency(
            "BESPOKE_CURRENCY",
            &get_env_or_default("BESPOKE_CURRENCY", "UGX"),
        )?;
        let checkout_delay = parse_millis(
            "BESPOKE_CHECKOUT_DELAY_MS",
            &get_env_or_default("BESPOKE_CHECKOUT_DELAY_MS", DEFAULT_CHECKOUT_DELAY_MS),
        )?;
        let notification_ttl = parse_millis(
            "BESPOKE_NOTIFICATION_TTL_MS",
            &get_env_or_default("BESPOKE_NOTIFICATION_TTL_MS", DEFAULT_NOTIFICATION_TTL_MS),
        )?;
        let analytics = AnalyticsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            data_dir,
            currency,
            checkout_delay,
            notification_ttl,
            analytics,
            sentry_dsn,
            sentry_environment,
        })
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            currency: CurrencyCode::default(),
            checkout_delay: crate::cart::manager::DEFAULT_CHECKOUT_DELAY,
            notification_ttl: crate::notifications::DEFAULT_NOTIFICATION_TTL,
            analytics: AnalyticsConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a millisecond count into a `Duration`, capped at [`MAX_DELAY_MS`].
fn parse_millis(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if millis > MAX_DELAY_MS {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be at most {MAX_DELAY_MS} ms (got {millis})"),
        ));
    }
    Ok(Duration::from_millis(millis))
}

/// Parse an ISO 4217 code the cart supports.
fn parse_currency(key: &str, raw: &str) -> Result<CurrencyCode, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "UGX" => Ok(CurrencyCode::UGX),
        "USD" => Ok(CurrencyCode::USD),
        "EUR" => Ok(CurrencyCode::EUR),
        "GBP" => Ok(CurrencyCode::GBP),
        "CAD" => Ok(CurrencyCode::CAD),
        "AUD" => Ok(CurrencyCode::AUD),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported currency '{other}'"),
        )),
    }
}

/// Meta pixel IDs are purely numeric.
fn parse_pixel_id(key: &str, raw: &str) -> Result<String, ConfigError> {
    let id = raw.trim();
    if id.chars().all(|c| c.is_ascii_digit()) {
        Ok(id.to_string())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "pixel ID must contain only digits".to_string(),
        ))
    }
}
