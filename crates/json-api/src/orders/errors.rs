//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use krua_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::AlreadyExists => {
            StatusError::conflict().brief("An order with this uuid already exists")
        }
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::InsufficientStock { .. } => {
            StatusError::conflict().brief("Not enough stock").cause(error.to_string())
        }
        OrdersServiceError::NoCustomer => StatusError::conflict()
            .brief("Create a customer profile before placing an order")
            .cause(error.to_string()),
        OrdersServiceError::ProductUnavailable(_)
        | OrdersServiceError::InvalidTransition { .. }
        | OrdersServiceError::NoLines
        | OrdersServiceError::ZeroQuantity
        | OrdersServiceError::Validation(_) => StatusError::bad_request()
            .brief("Invalid order")
            .cause(error.to_string()),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => StatusError::bad_request().brief("Invalid order payload"),
        OrdersServiceError::Pricing(source) => {
            error!("failed to price order: {source}");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
