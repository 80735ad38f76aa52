//! Admin Customer Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    customers::{errors::into_status_error, models::CustomersResponse},
    extensions::*,
    state::State,
};

/// Admin Customer Index Handler
#[endpoint(
    tags("customers", "admin"),
    summary = "List Customers",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CustomersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let customers = state
        .app
        .customers
        .list_customers()
        .await
        .map_err(into_status_error)?;

    Ok(Json(customers.into()))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        auth::Role,
        domain::customers::{MockCustomersService, models::CustomerUuid},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, make_customer, principal, service_as};

    use super::*;

    #[tokio::test]
    async fn test_lists_customers() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_list_customers()
            .once()
            .return_once(|| {
                Ok(vec![
                    make_customer(CustomerUuid::new()),
                    make_customer(CustomerUuid::new()),
                ])
            });

        let service = service_as(
            StateBuilder::new().customers(customers).build(),
            principal(&[Role::Moderator]),
            Router::with_path("admin/customers").get(handler),
        );

        let response: CustomersResponse = TestClient::get("http://example.com/admin/customers")
            .send(&service)
            .await
            .take_json()
            .await?;

        assert_eq!(response.customers.len(), 2);

        Ok(())
    }
}
