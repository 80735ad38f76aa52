//! Payment Notification Handler
//!
//! The gateway calls back with the order uuid and its new payment status. It
//! authenticates with a shared key in the `x-gateway-key` header; when no key
//! is configured every notification is rejected.

use std::sync::Arc;

use krua_app::{auth::hashes_match, domain::orders::models::PaymentStatus};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

const GATEWAY_KEY_HEADER: &str = "x-gateway-key";

/// Payment Notification
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentNotification {
    pub order_uuid: Uuid,

    /// `pending`, `paid`, `failed` or `refunded`
    pub payment_status: String,
}

fn gateway_key_matches(state: &State, req: &Request) -> bool {
    let Some(expected) = state.payment_gateway_key.as_deref() else {
        return false;
    };

    req.header::<String>(GATEWAY_KEY_HEADER)
        .is_some_and(|presented| hashes_match(expected, &presented))
}

/// Payment Notification Handler
#[endpoint(
    tags("payments"),
    summary = "Payment Notification",
    responses(
        (status_code = StatusCode::OK, description = "Payment recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown payment status"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or wrong gateway key"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
#[tracing::instrument(
    name = "payments.notify",
    skip(json, req, depot),
    fields(order_uuid = tracing::field::Empty, payment_status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<PaymentNotification>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    if !gateway_key_matches(state, req) {
        tracing::warn!("rejected payment notification with a bad gateway key");

        return Err(StatusError::unauthorized().brief("Invalid gateway key"));
    }

    let notification = json.into_inner();

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(notification.order_uuid));
    span.record("payment_status", notification.payment_status.as_str());

    let payment_status = notification
        .payment_status
        .trim()
        .parse::<PaymentStatus>()
        .or_400("Unknown payment status")?;

    let order = state
        .app
        .orders
        .update_payment_status(notification.order_uuid.into(), payment_status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
