//! Update Order Status Handler

use std::sync::Arc;

use krua_app::domain::orders::models::{OrderStatus, StatusUpdate};
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Status Update Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateStatusRequest {
    /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Update Order Status Handler
///
/// Moving an order to `shipped` emails the customer.
#[endpoint(
    tags("orders", "admin"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status or invalid transition"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
#[tracing::instrument(
    name = "orders.update_status",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty, status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner();
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("status", request.status.as_str());

    let status = request
        .status
        .trim()
        .parse::<OrderStatus>()
        .or_400("Unknown order status")?;

    let tracking_number = request
        .tracking_number
        .map(|number| number.trim().to_string())
        .filter(|number| !number.is_empty());

    let updated = state
        .app
        .orders
        .update_status(
            order.into(),
            StatusUpdate {
                status,
                tracking_number,
            },
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
