//! Quote Handler

use std::sync::Arc;

use krua::{pricing::MinorTotals, shipping::ShippingMethod};
use krua_app::domain::orders::models::{Quote, QuoteLine};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderLineBody},
    schemas::LocalizedTextBody,
    state::State,
};

/// Quote Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteRequest {
    pub lines: Vec<OrderLineBody>,

    /// `standard`, `express` or `collection`
    pub shipping_method: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteLineResponse {
    pub product_uuid: Uuid,
    pub sku: String,
    pub name: LocalizedTextBody,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
}

impl From<QuoteLine> for QuoteLineResponse {
    fn from(line: QuoteLine) -> Self {
        Self {
            product_uuid: line.product_uuid.into(),
            sku: line.sku,
            name: line.name.into(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total,
        }
    }
}

/// Quote totals in minor units. Item prices include VAT.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteTotalsResponse {
    pub items_inclusive: i64,
    pub subtotal: i64,
    pub vat: i64,
    pub shipping: i64,
    pub total: i64,
}

impl From<MinorTotals> for QuoteTotalsResponse {
    fn from(totals: MinorTotals) -> Self {
        Self {
            items_inclusive: totals.items_inclusive,
            subtotal: totals.subtotal,
            vat: totals.vat,
            shipping: totals.shipping,
            total: totals.total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QuoteResponse {
    pub lines: Vec<QuoteLineResponse>,
    pub shipping_method: String,
    pub currency: String,
    pub totals: QuoteTotalsResponse,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            lines: quote.lines.into_iter().map(Into::into).collect(),
            shipping_method: quote.shipping_method.as_str().to_string(),
            currency: quote.currency,
            totals: quote.totals.into(),
        }
    }
}

/// Quote Handler
///
/// Prices a basket at current catalogue prices without reserving stock.
#[endpoint(
    tags("checkout"),
    summary = "Quote Basket",
    responses(
        (status_code = StatusCode::OK, description = "Priced basket"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid basket"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limited"),
    ),
)]
#[tracing::instrument(
    name = "checkout.quote",
    skip(json, depot),
    fields(lines = tracing::field::Empty, shipping_method = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<QuoteRequest>,
    depot: &mut Depot,
) -> Result<Json<QuoteResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("lines", request.lines.len());
    span.record("shipping_method", request.shipping_method.as_str());

    let shipping_method = request
        .shipping_method
        .parse::<ShippingMethod>()
        .or_400("Unknown shipping method")?;

    let quote = state
        .app
        .orders
        .quote_order(
            request.lines.into_iter().map(Into::into).collect(),
            shipping_method,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(quote.into()))
}
