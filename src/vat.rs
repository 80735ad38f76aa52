//! VAT rates

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while building a [`VatRate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VatRateError {
    /// The rate is negative or unreasonably large.
    #[error("vat rate must be at least 0 and below 10 (1000%)")]
    OutOfRange,

    /// The rate could not be parsed.
    #[error("could not parse vat rate: {0}")]
    Parse(String),
}

/// A fractional VAT rate, where `0.15` means 15%.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VatRate(Decimal);

impl VatRate {
    /// The store's standard 15% rate.
    pub const STANDARD: Self = Self(Decimal::from_parts(15, 0, 0, false, 2));

    /// Zero-rated.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build a rate from a fraction.
    ///
    /// # Errors
    ///
    /// Returns [`VatRateError::OutOfRange`] when the rate is negative or ten or above.
    pub fn new(rate: Decimal) -> Result<Self, VatRateError> {
        if rate.is_sign_negative() || rate >= Decimal::TEN {
            return Err(VatRateError::OutOfRange);
        }

        Ok(Self(rate.normalize()))
    }

    /// Build a rate from a fractional percentage.
    ///
    /// # Errors
    ///
    /// Returns [`VatRateError::OutOfRange`] when the rate is negative or ten or above.
    pub fn from_percentage(percentage: Percentage) -> Result<Self, VatRateError> {
        Self::new(percentage * Decimal::ONE)
    }

    /// The rate as a fraction.
    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// The rate as a [`Percentage`].
    pub fn as_percentage(self) -> Percentage {
        Percentage::from(self.0)
    }

    /// `1 + rate`, the divisor that backs VAT out of an inclusive amount.
    pub fn inclusive_divisor(self) -> Decimal {
        Decimal::ONE + self.0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}

/// Parses `"15%"` (percent points) or `"0.15"` (fraction).
impl FromStr for VatRate {
    type Err = VatRateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        let rate = if let Some(points) = value.strip_suffix('%') {
            Decimal::from_str(points.trim())
                .map_err(|error| VatRateError::Parse(error.to_string()))?
                / Decimal::ONE_HUNDRED
        } else {
            Decimal::from_str(value).map_err(|error| VatRateError::Parse(error.to_string()))?
        };

        Self::new(rate)
    }
}

impl TryFrom<Decimal> for VatRate {
    type Error = VatRateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VatRate> for Decimal {
    fn from(value: VatRate) -> Self {
        value.0
    }
}
