//! Place Order Handler

use std::sync::Arc;

use krua::shipping::ShippingMethod;
use krua_app::domain::orders::models::{ConfirmationOutcome, NewOrder};
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::{record_confirmation, record_order_placed},
    orders::{
        errors::into_status_error,
        models::{OrderLineBody, PlacedOrderResponse},
    },
    schemas::AddressBody,
    state::State,
};

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlaceOrderRequest {
    /// Client-chosen order uuid. Resubmitting the same uuid is rejected.
    pub uuid: Uuid,

    pub lines: Vec<OrderLineBody>,

    /// `standard`, `express` or `collection`
    pub shipping_method: String,

    pub shipping_address: AddressBody,

    /// Defaults to the shipping address
    #[serde(default)]
    pub billing_address: Option<AddressBody>,
}

/// Place Order Handler
///
/// Reserves stock and records the order for the caller's customer profile.
/// The confirmation email is sent after the order commits; its outcome is
/// reported but never fails the request.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid order"),
        (status_code = StatusCode::CONFLICT, description = "Not enough stock, duplicate order or no customer profile"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::TOO_MANY_REQUESTS, description = "Rate limited"),
    ),
)]
#[tracing::instrument(
    name = "orders.place",
    skip(json, depot, res),
    fields(
        order_uuid = tracing::field::Empty,
        user_uuid = tracing::field::Empty,
        lines = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PlacedOrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(request.uuid));
    span.record("user_uuid", tracing::field::display(user));
    span.record("lines", request.lines.len());

    let shipping_method = request
        .shipping_method
        .parse::<ShippingMethod>()
        .or_400("Unknown shipping method")?;

    let placed = state
        .app
        .orders
        .place_order(
            user,
            NewOrder {
                uuid: request.uuid.into(),
                lines: request.lines.into_iter().map(Into::into).collect(),
                shipping_method,
                shipping_address: request.shipping_address.into(),
                billing_address: request.billing_address.map(Into::into),
            },
        )
        .await
        .map_err(into_status_error)?;

    record_order_placed();
    record_confirmation(placed.confirmation);

    if let ConfirmationOutcome::Failed { transient } = placed.confirmation {
        tracing::warn!(
            order_uuid = %placed.order.uuid,
            transient,
            "order placed without confirmation email"
        );
    }

    res.add_header(LOCATION, format!("/orders/{}", placed.order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(PlacedOrderResponse::new(
        placed.order,
        placed.confirmation,
    )))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        auth::Role,
        domain::{
            customers::models::CustomerUuid,
            orders::{
                MockOrdersService, OrdersServiceError,
                models::{OrderLine, OrderUuid, PlacedOrder},
            },
            products::models::ProductUuid,
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{
        StateBuilder, TEST_USER_UUID, anonymous_service, make_address, make_order, principal,
        service_as,
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("orders").post(handler)
    }

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            StateBuilder::new().orders(orders).build(),
            principal(&[Role::User]),
            route(),
        )
    }

    fn body(uuid: OrderUuid, product: ProductUuid) -> Value {
        json!({
            "uuid": uuid.into_uuid(),
            "lines": [{ "product_uuid": product.into_uuid(), "quantity": 2 }],
            "shipping_method": "standard",
            "shipping_address": {
                "recipient": "Somchai",
                "line1": "12 Long Street",
                "city": "Cape Town",
                "province": "Western Cape",
                "postal_code": "8001",
                "country": "ZA"
            }
        })
    }

    #[tokio::test]
    async fn test_place_order_success() -> TestResult {
        let uuid = OrderUuid::new();
        let product = ProductUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .withf(move |user, order| {
                *user == TEST_USER_UUID
                    && order.uuid == uuid
                    && order.lines
                        == vec![OrderLine {
                            product_uuid: product,
                            quantity: 2,
                        }]
                    && order.shipping_address == make_address()
                    && order.billing_address.is_none()
            })
            .return_once(move |_, _| {
                Ok(PlacedOrder {
                    order: make_order(uuid, CustomerUuid::new()),
                    confirmation: ConfirmationOutcome::Sent,
                })
            });

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(uuid, product))
            .send(&make_service(orders))
            .await;

        let placed: PlacedOrderResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{uuid}").as_str()));
        assert_eq!(placed.order.uuid, uuid.into_uuid());
        assert_eq!(placed.order.total, 14_000);
        assert_eq!(placed.confirmation, "sent");

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_confirmation_still_returns_201() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(move |_, _| {
            Ok(PlacedOrder {
                order: make_order(uuid, CustomerUuid::new()),
                confirmation: ConfirmationOutcome::Failed { transient: true },
            })
        });

        let mut res = TestClient::post("http://example.com/orders")
            .json(&body(uuid, ProductUuid::new()))
            .send(&make_service(orders))
            .await;

        let placed: PlacedOrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(placed.confirmation, "failed_transient");

        Ok(())
    }

    #[tokio::test]
    async fn test_short_stock_returns_409() -> TestResult {
        let product = ProductUuid::new();

        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(move |_, _| {
            Err(OrdersServiceError::InsufficientStock {
                product,
                requested: 2,
                available: 1,
            })
        });

        let res = TestClient::post("http://example.com/orders")
            .json(&body(OrderUuid::new(), product))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_customer_profile_returns_409() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NoCustomer));

        let res = TestClient::post("http://example.com/orders")
            .json(&body(OrderUuid::new(), ProductUuid::new()))
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_caller_returns_401() -> TestResult {
        let service = anonymous_service(StateBuilder::new().build(), route());

        let res = TestClient::post("http://example.com/orders")
            .json(&body(OrderUuid::new(), ProductUuid::new()))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
