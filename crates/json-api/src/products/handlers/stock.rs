//! Adjust Stock Handler

use std::sync::Arc;

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
    products::{errors::into_status_error, models::ProductResponse},
    state::State,
};

/// Stock Adjustment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdjustStockRequest {
    /// Units to add, or remove when negative
    pub delta: i32,
}

/// Adjust Stock Handler
///
/// A change that would take stock below zero is rejected.
#[endpoint(
    tags("products", "admin"),
    summary = "Adjust Stock",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Stock adjusted"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Stock would go negative"),
    ),
)]
#[tracing::instrument(
    name = "products.adjust_stock",
    skip(product, json, depot),
    fields(product_uuid = tracing::field::Empty, delta = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<AdjustStockRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = product.into_inner();
    let delta = json.into_inner().delta;

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("delta", delta);

    let adjusted = state
        .app
        .products
        .adjust_stock(product.into(), delta)
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, stock = adjusted.stock, "adjusted stock");

    Ok(Json(adjusted.into()))
}
