//! Retry Confirmations Handler

use std::sync::Arc;

use krua_app::domain::orders::models::ConfirmationReport;
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmationReportResponse {
    pub attempted: u32,
    pub sent: u32,
    pub failed: u32,
}

impl From<ConfirmationReport> for ConfirmationReportResponse {
    fn from(report: ConfirmationReport) -> Self {
        Self {
            attempted: report.attempted,
            sent: report.sent,
            failed: report.failed,
        }
    }
}

/// Retry Confirmations Handler
///
/// Resends confirmation emails for up to `limit` orders that never got one,
/// oldest first.
#[endpoint(
    tags("orders", "admin"),
    summary = "Retry Order Confirmations",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Reconciliation report"),
    ),
)]
#[tracing::instrument(name = "orders.retry_confirmations", skip(limit, depot), err)]
pub(crate) async fn handler(
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ConfirmationReportResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let limit = limit.into_inner().unwrap_or(DEFAULT_LIMIT);

    let report = state
        .app
        .orders
        .retry_pending_confirmations(limit)
        .await
        .map_err(into_status_error)?;

    tracing::info!(
        attempted = report.attempted,
        sent = report.sent,
        failed = report.failed,
        "retried order confirmations"
    );

    Ok(Json(report.into()))
}
