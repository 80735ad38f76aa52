//! My Customer Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    customers::{errors::into_status_error, models::CustomerResponse},
    extensions::*,
    state::State,
};

/// My Customer Handler
#[endpoint(
    tags("customers"),
    summary = "Get My Customer Profile",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's profile"),
        (status_code = StatusCode::NOT_FOUND, description = "No profile for this account"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CustomerResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;

    let customer = state
        .app
        .customers
        .get_customer_for_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(customer.into()))
}
