//! Krua prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    items::LineItem,
    language::{Language, UnknownLanguage},
    pricing::{MinorTotals, OrderTotals, PricingError, calculate_totals, quote},
    shipping::{ShippingMethod, UnknownShippingMethod},
    vat::{VatRate, VatRateError},
};
