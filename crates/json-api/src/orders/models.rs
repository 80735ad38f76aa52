//! Order bodies

use std::string::ToString;

use krua_app::domain::orders::models::{ConfirmationOutcome, Order, OrderItem, OrderLine};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schemas::{AddressBody, LocalizedTextBody};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    pub uuid: Uuid,

    /// Unset once the product has been removed from the catalogue
    pub product_uuid: Option<Uuid>,

    pub product_name: LocalizedTextBody,
    pub product_sku: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.map(Into::into),
            product_name: item.product_name.into(),
            product_sku: item.product_sku,
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total,
        }
    }
}

/// An order with its items. Amounts are in minor units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub customer_uuid: Uuid,
    pub status: String,
    pub payment_status: String,
    pub subtotal: i64,
    pub vat: i64,
    pub shipping: i64,
    pub total: i64,
    pub currency: String,
    pub shipping_method: String,
    pub shipping_address: AddressBody,
    pub billing_address: AddressBody,
    pub tracking_number: Option<String>,
    pub confirmation_sent_at: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            uuid: order.uuid.into(),
            customer_uuid: order.customer_uuid.into(),
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            subtotal: order.subtotal,
            vat: order.vat,
            shipping: order.shipping,
            total: order.total,
            currency: order.currency,
            shipping_method: order.shipping_method.as_str().to_string(),
            shipping_address: order.shipping_address.into(),
            billing_address: order.billing_address.into(),
            tracking_number: order.tracking_number,
            confirmation_sent_at: order.confirmation_sent_at.as_ref().map(ToString::to_string),
            items: order.items.into_iter().map(Into::into).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<Order>> for OrdersResponse {
    fn from(orders: Vec<Order>) -> Self {
        Self {
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}

/// A placed order and what happened to its confirmation email.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlacedOrderResponse {
    pub order: OrderResponse,

    /// `sent`, `failed`, `failed_transient` or `disabled`
    pub confirmation: String,
}

impl PlacedOrderResponse {
    pub(crate) fn new(order: Order, confirmation: ConfirmationOutcome) -> Self {
        Self {
            order: order.into(),
            confirmation: confirmation.as_str().to_string(),
        }
    }
}

/// One basket line in a quote or checkout request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineBody {
    pub product_uuid: Uuid,
    pub quantity: u32,
}

impl From<OrderLineBody> for OrderLine {
    fn from(line: OrderLineBody) -> Self {
        OrderLine {
            product_uuid: line.product_uuid.into(),
            quantity: line.quantity,
        }
    }
}
