//! Order Models

use jiff::Timestamp;
use krua::{pricing::MinorTotals, shipping::ShippingMethod};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        customers::models::CustomerUuid, localized::LocalizedText, products::models::ProductUuid,
    },
    uuids::TypedUuid,
};

pub use super::status::{OrderStatus, PaymentStatus, UnknownStatus};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Postal address, stored as JSON on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub recipient: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Order Model
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub uuid: OrderUuid,
    pub customer_uuid: CustomerUuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: i64,
    pub vat: i64,
    pub shipping: i64,
    pub total: i64,
    pub currency: String,
    pub shipping_method: ShippingMethod,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub tracking_number: Option<String>,
    pub confirmation_sent_at: Option<Timestamp>,
    pub items: Vec<OrderItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A line on an order, with the product details as they were at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,

    /// `None` once the product row has been removed.
    pub product_uuid: Option<ProductUuid>,

    pub product_name: LocalizedText,
    pub product_sku: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
}

/// A requested basket line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

/// New Order Model. The uuid is chosen by the client so that a resubmitted
/// checkout is rejected instead of creating a second order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub lines: Vec<OrderLine>,
    pub shipping_method: ShippingMethod,
    pub shipping_address: Address,

    /// Defaults to the shipping address.
    pub billing_address: Option<Address>,
}

/// Status change requested by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer: Option<CustomerUuid>,
}

/// A priced basket line in a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine {
    pub product_uuid: ProductUuid,
    pub sku: String,
    pub name: LocalizedText,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
}

/// Checkout summary. Computed the same way as a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub shipping_method: ShippingMethod,
    pub currency: String,
    pub totals: MinorTotals,
}

/// What happened to the confirmation email after an order was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Sent,

    /// Left for [`retry_pending_confirmations`](super::OrdersService::retry_pending_confirmations).
    Failed { transient: bool },

    Disabled,
}

impl ConfirmationOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed { transient: true } => "failed_transient",
            Self::Failed { transient: false } => "failed",
            Self::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: Order,
    pub confirmation: ConfirmationOutcome,
}

/// Result of a confirmation reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmationReport {
    pub attempted: u32,
    pub sent: u32,
    pub failed: u32,
}
