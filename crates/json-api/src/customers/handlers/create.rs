//! Create Customer Handler

use std::sync::Arc;

use krua_app::domain::customers::models::NewCustomer;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    customers::{
        errors::into_status_error,
        models::{CustomerDetails, CustomerResponse},
    },
    extensions::*,
    state::State,
};

/// Create Customer Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCustomerRequest {
    pub uuid: Uuid,

    #[serde(flatten)]
    pub details: CustomerDetails,
}

/// Create Customer Handler
///
/// Creates the caller's customer profile. Each account has at most one.
#[endpoint(
    tags("customers"),
    summary = "Create Customer Profile",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Profile created"),
        (status_code = StatusCode::CONFLICT, description = "Profile already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid customer details"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
    ),
)]
#[tracing::instrument(
    name = "customers.create",
    skip(json, depot, res),
    fields(customer_uuid = tracing::field::Empty, user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCustomerRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CustomerResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("customer_uuid", tracing::field::display(request.uuid));
    span.record("user_uuid", tracing::field::display(user));

    let preferred_language = request.details.language()?;

    let customer = state
        .app
        .customers
        .create_customer(
            user,
            NewCustomer {
                uuid: request.uuid.into(),
                name: request.details.name,
                email: request.details.email,
                phone: request.details.phone,
                preferred_language,
            },
        )
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, "/me/customer", true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(customer.into()))
}
