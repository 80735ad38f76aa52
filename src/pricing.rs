//! Order totals
//!
//! Prices are stored VAT-inclusive. The VAT-exclusive subtotal is backed out of
//! the inclusive sum once, and the VAT is whatever remains, so the figures shown
//! at checkout and the figures persisted on the order always add up exactly.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso};
use serde::Serialize;
use thiserror::Error;

use crate::{items::LineItem, shipping::ShippingMethod, vat::VatRate, vat::VatRateError};

/// Errors that can occur while calculating order totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No items were provided, so currency could not be determined.
    #[error("no items provided; cannot determine currency")]
    NoItems,

    /// A line has a quantity of zero.
    #[error("line quantities must be at least 1")]
    ZeroQuantity,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A total does not fit in minor units.
    #[error("order total overflowed")]
    Overflow,

    /// The VAT rate is not usable.
    #[error(transparent)]
    InvalidRate(#[from] VatRateError),
}

/// The money breakdown of an order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderTotals<'a> {
    /// Sum of the VAT-inclusive line totals
    pub items_inclusive: Money<'a, iso::Currency>,

    /// VAT-exclusive value of the items
    pub subtotal: Money<'a, iso::Currency>,

    /// VAT contained in the items
    pub vat: Money<'a, iso::Currency>,

    /// VAT-inclusive shipping
    pub shipping: Money<'a, iso::Currency>,

    /// Amount payable
    pub total: Money<'a, iso::Currency>,
}

/// [`OrderTotals`] flattened to minor units, for storage and JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MinorTotals {
    /// Sum of the VAT-inclusive line totals
    pub items_inclusive: i64,

    /// VAT-exclusive value of the items
    pub subtotal: i64,

    /// VAT contained in the items
    pub vat: i64,

    /// VAT-inclusive shipping
    pub shipping: i64,

    /// Amount payable
    pub total: i64,
}

impl OrderTotals<'_> {
    /// The totals as minor units.
    pub fn to_minor_units(&self) -> MinorTotals {
        MinorTotals {
            items_inclusive: self.items_inclusive.to_minor_units(),
            subtotal: self.subtotal.to_minor_units(),
            vat: self.vat.to_minor_units(),
            shipping: self.shipping.to_minor_units(),
            total: self.total.to_minor_units(),
        }
    }
}

/// Calculates subtotal, VAT and total for VAT-inclusive line items and shipping.
///
/// # Errors
///
/// - [`PricingError::NoItems`]: No items were provided.
/// - [`PricingError::ZeroQuantity`]: A line has a zero quantity.
/// - [`PricingError::Money`]: Lines or shipping are in different currencies.
/// - [`PricingError::Overflow`]: A sum does not fit in minor units.
pub fn calculate_totals<'a>(
    items: &[LineItem<'a>],
    shipping: Money<'a, iso::Currency>,
    rate: VatRate,
) -> Result<OrderTotals<'a>, PricingError> {
    let first = items.first().ok_or(PricingError::NoItems)?;
    let currency = first.unit_price().currency();

    let items_inclusive = items.iter().try_fold(
        Money::from_minor(0, currency),
        |acc, item| -> Result<_, PricingError> {
            if item.quantity() == 0 {
                return Err(PricingError::ZeroQuantity);
            }

            let line = item.line_total_minor().ok_or(PricingError::Overflow)?;
            let line = Money::from_minor(line, item.unit_price().currency());

            acc.to_minor_units()
                .checked_add(line.to_minor_units())
                .ok_or(PricingError::Overflow)?;

            Ok(acc.add(line)?)
        },
    )?;

    let inclusive_minor = items_inclusive.to_minor_units();

    let subtotal_minor = Decimal::from(inclusive_minor)
        .checked_div(rate.inclusive_divisor())
        .ok_or(PricingError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Overflow)?;

    let vat_minor = inclusive_minor
        .checked_sub(subtotal_minor)
        .ok_or(PricingError::Overflow)?;

    inclusive_minor
        .checked_add(shipping.to_minor_units())
        .ok_or(PricingError::Overflow)?;

    let subtotal = Money::from_minor(subtotal_minor, currency);
    let vat = Money::from_minor(vat_minor, currency);
    let total = subtotal.add(vat)?.add(shipping)?;

    Ok(OrderTotals {
        items_inclusive,
        subtotal,
        vat,
        shipping,
        total,
    })
}

/// Prices `(unit price minor, quantity)` lines with a shipping method.
///
/// The checkout quote and order placement both call this.
///
/// # Errors
///
/// See [`calculate_totals`].
pub fn quote<'a>(
    currency: &'a iso::Currency,
    lines: &[(i64, u32)],
    shipping: ShippingMethod,
    rate: VatRate,
) -> Result<OrderTotals<'a>, PricingError> {
    let items: Vec<LineItem<'a>> = lines
        .iter()
        .map(|&(unit_price, quantity)| {
            LineItem::new(Money::from_minor(unit_price, currency), quantity)
        })
        .collect();

    calculate_totals(&items, shipping.price(currency), rate)
}
