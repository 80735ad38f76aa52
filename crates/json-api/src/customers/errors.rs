//! Customer Errors

use salvo::http::StatusError;
use tracing::error;

use krua_app::domain::customers::CustomersServiceError;

pub(crate) fn into_status_error(error: CustomersServiceError) -> StatusError {
    match error {
        CustomersServiceError::AlreadyExists => {
            StatusError::conflict().brief("A customer profile already exists for this account")
        }
        CustomersServiceError::NotFound => {
            StatusError::not_found().brief("Customer profile not found")
        }
        CustomersServiceError::Validation(_) => StatusError::bad_request()
            .brief("Invalid customer details")
            .cause(error.to_string()),
        CustomersServiceError::InvalidReference
        | CustomersServiceError::MissingRequiredData
        | CustomersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid customer details")
        }
        CustomersServiceError::Sql(source) => {
            error!("customer storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
