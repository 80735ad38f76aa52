//! Submit Contact Message Handler

use std::sync::Arc;

use krua_app::domain::contact::models::NewContactMessage;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    contact::{errors::into_status_error, models::ContactMessageResponse},
    extensions::*,
    state::State,
};

/// Contact Message Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ContactMessageRequest {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,

    /// At most 5000 characters
    pub message: String,
}

/// Submit Contact Message Handler
#[endpoint(
    tags("contact"),
    summary = "Submit Contact Message",
    responses(
        (status_code = StatusCode::CREATED, description = "Message received"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid message"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limited"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ContactMessageRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ContactMessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let message = state
        .app
        .contact
        .submit(NewContactMessage {
            uuid: request.uuid.into(),
            name: request.name,
            email: request.email,
            subject: request.subject,
            message: request.message,
        })
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(message.into()))
}
