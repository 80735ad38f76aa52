//! Contact Errors

use salvo::http::StatusError;
use tracing::error;

use krua_app::domain::contact::ContactServiceError;

pub(crate) fn into_status_error(error: ContactServiceError) -> StatusError {
    match error {
        ContactServiceError::AlreadyExists => {
            StatusError::conflict().brief("This message was already received")
        }
        ContactServiceError::Validation(_) => StatusError::bad_request()
            .brief("Invalid message")
            .cause(error.to_string()),
        ContactServiceError::InvalidData => StatusError::bad_request().brief("Invalid message"),
        ContactServiceError::Sql(source) => {
            error!("contact storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
