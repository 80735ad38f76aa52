//! Line items

use rusty_money::{Money, iso};

/// A basket line: a VAT-inclusive unit price and how many of it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    unit_price: Money<'a, iso::Currency>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a new line item
    pub fn new(unit_price: Money<'a, iso::Currency>, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Returns the VAT-inclusive unit price
    pub fn unit_price(&self) -> &Money<'a, iso::Currency> {
        &self.unit_price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns `unit_price × quantity` in minor units, or `None` on overflow.
    pub fn line_total_minor(&self) -> Option<i64> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
    }
}
