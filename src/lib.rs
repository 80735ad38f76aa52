//! Krua
//!
//! Pricing core for the Krua storefront: VAT rates, line items, shipping
//! methods and the order totals that checkout and order placement share.

pub mod items;
pub mod language;
pub mod pricing;
pub mod shipping;
pub mod vat;

pub mod prelude;
