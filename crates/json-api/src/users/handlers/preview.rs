//! Deletion Preview Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::DeletionPreviewResponse},
};

/// Deletion Preview Handler
///
/// Counts the rows a delete would remove, without changing anything.
#[endpoint(
    tags("users", "admin"),
    summary = "Preview User Deletion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Dependent row counts"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<DeletionPreviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let preview = state
        .app
        .users
        .preview_user_deletion(user.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(preview.into()))
}
