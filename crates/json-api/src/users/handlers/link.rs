//! Link Orphan Handler

use std::sync::Arc;

use krua_app::{
    audit::{SecurityEvent, SecurityEventKind},
    domain::users::models::LinkTarget,
};
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    customers::models::CustomerResponse,
    extensions::*,
    state::State,
    users::errors::into_status_error,
};

/// Link Request
///
/// Either `customer_uuid` of an unlinked customer, or a `name` (and optional
/// `phone`) for a new customer created from the account's email.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LinkRequest {
    #[serde(default)]
    pub customer_uuid: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl LinkRequest {
    fn into_target(self) -> Result<LinkTarget, StatusError> {
        match (self.customer_uuid, self.name) {
            (Some(customer), None) => Ok(LinkTarget::Existing(customer.into())),
            (None, Some(name)) => Ok(LinkTarget::New {
                name,
                phone: self.phone,
            }),
            (Some(_), Some(_)) | (None, None) => Err(StatusError::bad_request()
                .brief("Provide either customer_uuid or name")),
        }
    }
}

/// Link Orphan Handler
#[endpoint(
    tags("users", "admin"),
    summary = "Link Orphaned User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Linked customer"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid link target"),
        (status_code = StatusCode::NOT_FOUND, description = "User or customer not found"),
        (status_code = StatusCode::CONFLICT, description = "Already linked"),
    ),
)]
#[tracing::instrument(
    name = "users.link_orphan",
    skip(user, json, req, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    json: JsonBody<LinkRequest>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CustomerResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.principal_or_401()?.user_uuid;
    let user = user.into_inner();

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let target = json.into_inner().into_target()?;

    let customer = state
        .app
        .users
        .link_orphan(user.into(), target)
        .await
        .map_err(into_status_error)?;

    state
        .app
        .audit
        .record(
            SecurityEvent::new(SecurityEventKind::OrphanLinked)
                .user(actor)
                .subject(user)
                .detail(json!({ "customer_uuid": customer.uuid.into_uuid() }))
                .remote_addr(req.client_ip(state.rate_limiter.trusts_forwarded_for())),
        )
        .await;

    Ok(Json(customer.into()))
}
