//! Shipping methods

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::Language;

/// How an order reaches the customer. Prices are flat and VAT-inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// Courier, three to five working days
    #[default]
    Standard,

    /// Overnight courier
    Express,

    /// Collected from the kitchen
    Collection,
}

/// Unknown shipping method name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported shipping method: {0}")]
pub struct UnknownShippingMethod(pub String);

impl ShippingMethod {
    /// All methods, in display order.
    pub const ALL: [ShippingMethod; 3] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::Collection,
    ];

    /// VAT-inclusive price in whole units of the store currency.
    pub fn price_major(self) -> i64 {
        match self {
            ShippingMethod::Standard => 50,
            ShippingMethod::Express => 120,
            ShippingMethod::Collection => 0,
        }
    }

    /// VAT-inclusive price in the given currency, scaled to its minor unit.
    pub fn price<'a>(self, currency: &'a iso::Currency) -> Money<'a, iso::Currency> {
        Money::from_major(self.price_major(), currency)
    }

    /// Customer-facing label.
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (ShippingMethod::Standard, Language::En) => "Standard delivery",
            (ShippingMethod::Standard, Language::Th) => "จัดส่งแบบมาตรฐาน",
            (ShippingMethod::Express, Language::En) => "Express delivery",
            (ShippingMethod::Express, Language::Th) => "จัดส่งด่วน",
            (ShippingMethod::Collection, Language::En) => "Collect in store",
            (ShippingMethod::Collection, Language::Th) => "รับสินค้าที่ร้าน",
        }
    }

    /// Name stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Express => "express",
            ShippingMethod::Collection => "collection",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = UnknownShippingMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ShippingMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| UnknownShippingMethod(value.to_string()))
    }
}
