//! Contact Message Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    contact::{errors::into_status_error, models::ContactMessagesResponse},
    extensions::*,
    state::State,
};

/// Contact Message Index Handler
///
/// Newest messages first.
#[endpoint(
    tags("contact", "admin"),
    summary = "List Contact Messages",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<ContactMessagesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let messages = state
        .app
        .contact
        .list_messages()
        .await
        .map_err(into_status_error)?;

    Ok(Json(messages.into()))
}
