//! Admin Order Index Handler

use std::sync::Arc;

use krua_app::domain::orders::models::{OrderFilter, OrderStatus};
use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersResponse},
    state::State,
};

/// Admin Order Index Handler
///
/// Lists every order, newest first, optionally narrowed by status or customer.
#[endpoint(
    tags("orders", "admin"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    customer: QueryParam<Uuid, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = status
        .into_inner()
        .map(|status| status.trim().parse::<OrderStatus>())
        .transpose()
        .or_400("Unknown order status")?;

    let filter = OrderFilter {
        status,
        customer: customer.into_inner().map(Into::into),
    };

    let orders = state
        .app
        .orders
        .list_orders(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        auth::Role,
        domain::{
            customers::models::CustomerUuid,
            orders::{MockOrdersService, models::OrderUuid},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, make_order, principal, service_as};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            StateBuilder::new().orders(orders).build(),
            principal(&[Role::Moderator]),
            Router::with_path("admin/orders").get(handler),
        )
    }

    #[tokio::test]
    async fn test_filters_by_status() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|filter| {
                *filter
                    == OrderFilter {
                        status: Some(OrderStatus::Shipped),
                        customer: None,
                    }
            })
            .return_once(|_| Ok(vec![make_order(OrderUuid::new(), CustomerUuid::new())]));

        let response: OrdersResponse =
            TestClient::get("http://example.com/admin/orders?status=shipped")
                .send(&make_service(orders))
                .await
                .take_json()
                .await?;

        assert_eq!(response.orders.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_unfiltered_listing() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|filter| *filter == OrderFilter::default())
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/admin/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/admin/orders?status=lost")
            .send(&make_service(MockOrdersService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
