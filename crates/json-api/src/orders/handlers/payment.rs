//! Update Payment Status Handler

use std::sync::Arc;

use krua_app::domain::orders::models::PaymentStatus;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
    state::State,
};

/// Payment Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdatePaymentRequest {
    /// `pending`, `paid`, `failed` or `refunded`
    pub payment_status: String,
}

/// Update Payment Status Handler
///
/// A paid order that is still pending moves to `processing`.
#[endpoint(
    tags("orders", "admin"),
    summary = "Update Payment Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown payment status"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdatePaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let payment_status = json
        .into_inner()
        .payment_status
        .trim()
        .parse::<PaymentStatus>()
        .or_400("Unknown payment status")?;

    let updated = state
        .app
        .orders
        .update_payment_status(order.into_inner().into(), payment_status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        auth::Role,
        domain::{
            customers::models::CustomerUuid,
            orders::{
                MockOrdersService,
                models::{Order, OrderStatus, OrderUuid},
            },
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, make_order, principal, service_as};

    use super::*;

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            StateBuilder::new().orders(orders).build(),
            principal(&[Role::Moderator]),
            Router::with_path("admin/orders/{order}/payment").put(handler),
        )
    }

    #[tokio::test]
    async fn test_paid_order_moves_to_processing() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_update_payment_status()
            .once()
            .withf(move |order, status| *order == uuid && *status == PaymentStatus::Paid)
            .return_once(move |_, _| {
                Ok(Order {
                    status: OrderStatus::Processing,
                    payment_status: PaymentStatus::Paid,
                    ..make_order(uuid, CustomerUuid::new())
                })
            });

        let order: OrderResponse =
            TestClient::put(format!("http://example.com/admin/orders/{uuid}/payment"))
                .json(&json!({ "payment_status": "paid" }))
                .send(&make_service(orders))
                .await
                .take_json()
                .await?;

        assert_eq!(order.payment_status, "paid");
        assert_eq!(order.status, "processing");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_payment_status_returns_400() -> TestResult {
        let res = TestClient::put(format!(
            "http://example.com/admin/orders/{}/payment",
            Uuid::now_v7()
        ))
        .json(&json!({ "payment_status": "maybe" }))
        .send(&make_service(MockOrdersService::new()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
