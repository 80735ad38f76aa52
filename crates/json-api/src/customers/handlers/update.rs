//! Update Customer Handler

use std::sync::Arc;

use krua_app::domain::customers::models::CustomerUpdate;
use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    customers::{
        errors::into_status_error,
        models::{CustomerDetails, CustomerResponse},
    },
    extensions::*,
    state::State,
};

/// Update Customer Handler
///
/// Replaces the caller's own profile details.
#[endpoint(
    tags("customers"),
    summary = "Update Customer Profile",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Profile updated"),
        (status_code = StatusCode::NOT_FOUND, description = "No profile for this account"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid customer details"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CustomerDetails>,
    depot: &mut Depot,
) -> Result<Json<CustomerResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.principal_or_401()?.user_uuid;
    let details = json.into_inner();

    let preferred_language = details.language()?;

    let customer = state
        .app
        .customers
        .update_customer(
            user,
            CustomerUpdate {
                name: details.name,
                email: details.email,
                phone: details.phone,
                preferred_language,
            },
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(customer.into()))
}

#[cfg(test)]
mod tests {
    use krua::language::Language;
    use krua_app::{
        auth::Role,
        domain::customers::{
            CustomersServiceError, MockCustomersService,
            models::{Customer, CustomerUuid},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, TEST_USER_UUID, make_customer, principal, service_as};

    use super::*;

    fn make_service(customers: MockCustomersService) -> Service {
        service_as(
            StateBuilder::new().customers(customers).build(),
            principal(&[Role::User]),
            Router::with_path("update-customer").post(handler),
        )
    }

    #[tokio::test]
    async fn test_update_own_profile() -> TestResult {
        let uuid = CustomerUuid::new();

        let mut customers = MockCustomersService::new();

        customers
            .expect_update_customer()
            .once()
            .withf(|user, update| {
                *user == TEST_USER_UUID
                    && update.phone.as_deref() == Some("+27 21 555 0100")
                    && update.preferred_language == Language::En
            })
            .return_once(move |_, update| {
                Ok(Customer {
                    phone: update.phone,
                    preferred_language: update.preferred_language,
                    ..make_customer(uuid)
                })
            });

        let customer: CustomerResponse = TestClient::post("http://example.com/update-customer")
            .json(&json!({
                "name": "Somchai",
                "email": "somchai@example.com",
                "phone": "+27 21 555 0100"
            }))
            .send(&make_service(customers))
            .await
            .take_json()
            .await?;

        assert_eq!(customer.phone.as_deref(), Some("+27 21 555 0100"));
        assert_eq!(customer.preferred_language, "en");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_profile_returns_404() -> TestResult {
        let mut customers = MockCustomersService::new();

        customers
            .expect_update_customer()
            .once()
            .return_once(|_, _| Err(CustomersServiceError::NotFound));

        let res = TestClient::post("http://example.com/update-customer")
            .json(&json!({ "name": "Somchai", "email": "somchai@example.com" }))
            .send(&make_service(customers))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
