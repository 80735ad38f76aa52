//! User Administration Errors

use salvo::http::StatusError;
use tracing::error;

use krua_app::{auth::AuthServiceError, domain::users::UsersServiceError};

pub(crate) fn into_status_error(error: UsersServiceError) -> StatusError {
    match error {
        UsersServiceError::NotFound => StatusError::not_found().brief("User not found"),
        UsersServiceError::CustomerNotFound => {
            StatusError::not_found().brief("Customer not found")
        }
        UsersServiceError::AlreadyLinked => {
            StatusError::conflict().brief("User or customer is already linked")
        }
        UsersServiceError::CannotDeleteSelf => {
            StatusError::bad_request().brief("Administrators cannot delete their own account")
        }
        UsersServiceError::Validation(_) => StatusError::bad_request()
            .brief("Invalid customer details")
            .cause(error.to_string()),
        UsersServiceError::InvalidData => StatusError::bad_request().brief("Invalid data"),
        UsersServiceError::Sql(source) => {
            error!("user administration storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn role_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::NotFound => StatusError::not_found().brief("User not found"),
        AuthServiceError::AlreadyExists | AuthServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid role change")
        }
        AuthServiceError::Sql(source) => {
            error!("role storage error: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Token(source) => {
            error!("unexpected token error while changing roles: {source}");

            StatusError::internal_server_error()
        }
    }
}
