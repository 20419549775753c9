//! Type-safe price representation using decimal arithmetic.
//!
//! Prices keep the amount in the currency's standard unit (shillings or
//! dollars, never cents) as a [`Decimal`], so running cart totals never drift the way
//! floating-point sums do.

use core::fmt;
use core::ops::{Add, Sub};

use num_format::{Locale, ToFormattedString};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., shillings, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Ugandan shillings.
    #[must_use]
    pub const fn ugx(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::UGX)
    }

    /// Create a price in US dollars.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Whether the amount is zero or positive.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        !self.amount.is_sign_negative() || self.amount.is_zero()
    }

    /// Format for display (e.g., "UGX 25,000" or "$1,019.99").
    ///
    /// Rounds to the currency's minor units and groups thousands.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.amount.round_dp_with_strategy(
            self.currency_code.minor_units(),
            RoundingStrategy::MidpointAwayFromZero,
        );
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = rounded.abs();
        let whole = abs.trunc();
        let whole = whole
            .to_u64()
            .map_or_else(|| whole.to_string(), |n| n.to_formatted_string(&Locale::en));

        if self.currency_code.minor_units() == 0 {
            format!("{sign}{}{whole}", self.currency_code.prefix())
        } else {
            let fraction = format!("{:.2}", abs.fract());
            format!(
                "{sign}{}{whole}{}",
                self.currency_code.prefix(),
                fraction.trim_start_matches('0')
            )
        }
    }

    /// The amount as a float, for analytics payloads that expect JSON numbers.
    #[must_use]
    pub fn amount_f64(&self) -> f64 {
        self.amount.to_f64().unwrap_or_default()
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero(CurrencyCode::default())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

// Mixing currencies is a caller bug; the left-hand currency wins.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        debug_assert_eq!(self.currency_code, rhs.currency_code);
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        debug_assert_eq!(self.currency_code, rhs.currency_code);
        Self::new(self.amount - rhs.amount, self.currency_code)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    UGX,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Text placed before the amount when displayed.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::UGX => "UGX ",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Digits after the decimal point in everyday amounts.
    #[must_use]
    pub const fn minor_units(&self) -> u32 {
        match self {
            Self::UGX => 0,
            _ => 2,
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UGX => "UGX",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
