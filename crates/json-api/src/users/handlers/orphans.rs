//! Orphaned Users Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::OrphanedUsersResponse},
};

/// Orphaned Users Handler
///
/// Accounts that have signed up but have no customer profile.
#[endpoint(
    tags("users", "admin"),
    summary = "List Orphaned Users",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<OrphanedUsersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let users = state
        .app
        .users
        .list_orphaned_users()
        .await
        .map_err(into_status_error)?;

    Ok(Json(users.into()))
}
