//! My Orders Handler

use std::sync::Arc;

use krua_app::domain::customers::CustomersServiceError;
use salvo::prelude::*;

use crate::{
    customers,
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// My Orders Handler
///
/// A caller without a customer profile has no orders yet.
#[endpoint(
    tags("orders"),
    summary = "List My Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's orders"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;

    let customer = match state.app.customers.get_customer_for_user(user).await {
        Ok(customer) => customer,
        Err(CustomersServiceError::NotFound) => return Ok(Json(Vec::new().into())),
        Err(error) => return Err(customers::errors::into_status_error(error)),
    };

    let orders = state
        .app
        .orders
        .list_customer_orders(customer.uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        auth::Role,
        domain::{
            customers::{MockCustomersService, models::CustomerUuid},
            orders::{MockOrdersService, models::OrderUuid},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{
        StateBuilder, TEST_USER_UUID, make_customer, make_order, principal, service_as,
    };

    use super::*;

    fn make_service(customers: MockCustomersService, orders: MockOrdersService) -> Service {
        service_as(
            StateBuilder::new()
                .customers(customers)
                .orders(orders)
                .build(),
            principal(&[Role::User]),
            Router::with_path("me/orders").get(handler),
        )
    }

    #[tokio::test]
    async fn test_lists_orders_for_callers_customer() -> TestResult {
        let customer = CustomerUuid::new();
        let order = OrderUuid::new();

        let mut customers = MockCustomersService::new();

        customers
            .expect_get_customer_for_user()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(make_customer(customer)));

        let mut orders = MockOrdersService::new();

        orders
            .expect_list_customer_orders()
            .once()
            .withf(move |uuid| *uuid == customer)
            .return_once(move |_| Ok(vec![make_order(order, customer)]));

        let response: OrdersResponse = TestClient::get("http://example.com/me/orders")
            .send(&make_service(customers, orders))
            .await
            .take_json()
            .await?;

        assert_eq!(
            response.orders.iter().map(|o| o.uuid).collect::<Vec<_>>(),
            vec![order.into_uuid()]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_caller_without_profile_gets_empty_list() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_get_customer_for_user()
            .once()
            .return_once(|_| Err(CustomersServiceError::NotFound));

        let response: OrdersResponse = TestClient::get("http://example.com/me/orders")
            .send(&make_service(customers, MockOrdersService::new()))
            .await
            .take_json()
            .await?;

        assert!(response.orders.is_empty());

        Ok(())
    }
}
