//! App Router
//!
//! Public routes come first and never see the auth middleware. Everything
//! else sits behind [`auth::handler`] and one of the role gates.

use salvo::Router;

use crate::{
    auth, checkout, contact, customers, orders, payments, products, rate_limit, users,
};

fn public() -> Router {
    Router::new()
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(
            Router::with_path("checkout/quote")
                .hoop(rate_limit::handler)
                .post(checkout::quote::handler),
        )
        .push(
            Router::with_path("contact")
                .hoop(rate_limit::handler)
                .post(contact::create::handler),
        )
        .push(Router::with_path("payments/notify").post(payments::notify::handler))
}

fn customer() -> Router {
    Router::new()
        .hoop(auth::require_user)
        .push(Router::with_path("create-customer").post(customers::create::handler))
        .push(Router::with_path("update-customer").post(customers::update::handler))
        .push(Router::with_path("me/customer").get(customers::me::handler))
        .push(Router::with_path("me/orders").get(orders::mine::handler))
        .push(
            Router::with_path("orders")
                .hoop(rate_limit::handler)
                .post(orders::create::handler),
        )
}

fn moderator() -> Router {
    Router::new()
        .hoop(auth::require_moderator)
        .push(
            Router::with_path("admin/orders")
                .get(orders::admin_index::handler)
                .push(Router::with_path("confirmations/retry").post(orders::retry::handler))
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("status").put(orders::status::handler))
                        .push(Router::with_path("payment").put(orders::payment::handler)),
                ),
        )
        .push(Router::with_path("admin/customers").get(customers::admin_index::handler))
        .push(Router::with_path("contact").get(contact::index::handler))
}

fn admin() -> Router {
    Router::new()
        .hoop(auth::require_admin)
        .push(Router::with_path("admin/products").get(products::admin_index::handler))
        .push(
            Router::with_path("products")
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .put(products::update::handler)
                        .delete(products::delete::handler)
                        .push(Router::with_path("stock").post(products::stock::handler)),
                ),
        )
        .push(Router::with_path("admin/orders/{order}").delete(orders::delete::handler))
        .push(
            Router::with_path("admin/users")
                .push(Router::with_path("orphans").get(users::orphans::handler))
                .push(
                    Router::with_path("{user}")
                        .delete(users::delete::handler)
                        .push(Router::with_path("link").post(users::link::handler))
                        .push(
                            Router::with_path("deletion-preview").get(users::preview::handler),
                        )
                        .push(
                            Router::with_path("roles/{role}")
                                .put(users::roles::grant)
                                .delete(users::roles::revoke),
                        ),
                ),
        )
}

pub fn app_router() -> Router {
    Router::new().push(public()).push(
        Router::new()
            .hoop(auth::handler)
            .push(customer())
            .push(moderator())
            .push(admin()),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use krua_app::{
        audit::MockAuditService,
        auth::{AuthServiceError, MockAuthService, Role},
        domain::products::MockProductsService,
    };
    use salvo::{
        affix_state::inject,
        http::StatusCode,
        prelude::*,
        test::TestClient,
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        rate_limit::{RateLimitSettings, RateLimiter},
        test_helpers::{StateBuilder, principal},
    };

    use super::*;

    fn service(builder: StateBuilder) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(builder.build()))
                .push(app_router()),
        )
    }

    fn authenticating_as(roles: &'static [Role]) -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .returning(move |_| Ok(principal(roles)));

        auth
    }

    #[tokio::test]
    async fn test_storefront_needs_no_token() -> TestResult {
        let mut products = MockProductsService::new();

        products
            .expect_list_products()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get("http://example.com/products")
            .send(&service(StateBuilder::new().products(products)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_back_office_needs_a_token() -> TestResult {
        let res = TestClient::get("http://example.com/admin/orders")
            .send(&service(StateBuilder::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_token_is_audited() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        let mut audit = MockAuditService::new();

        audit.expect_record().once().return_const(());

        let res = TestClient::get("http://example.com/me/customer")
            .add_header("authorization", "Bearer kr_v1_bogus", true)
            .send(&service(StateBuilder::new().auth(auth).audit(audit)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_customers_cannot_reach_admin_routes() -> TestResult {
        let mut audit = MockAuditService::new();

        audit.expect_record().once().return_const(());

        let res = TestClient::post("http://example.com/products")
            .add_header("authorization", "Bearer kr_v1_token", true)
            .json(&json!({}))
            .send(&service(
                StateBuilder::new()
                    .auth(authenticating_as(&[Role::User]))
                    .audit(audit),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_moderators_cannot_delete_orders() -> TestResult {
        let mut audit = MockAuditService::new();

        audit.expect_record().once().return_const(());

        let res = TestClient::delete(format!(
            "http://example.com/admin/orders/{}",
            uuid::Uuid::now_v7()
        ))
        .add_header("authorization", "Bearer kr_v1_token", true)
        .send(&service(
            StateBuilder::new()
                .auth(authenticating_as(&[Role::Moderator]))
                .audit(audit),
        ))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_contact_form_is_rate_limited() -> TestResult {
        let limiter = RateLimiter::new(RateLimitSettings {
            max_requests: 0,
            window: Duration::from_secs(60),
            capacity: 16,
            trust_forwarded_for: true,
        });

        let res = TestClient::post("http://example.com/contact")
            .add_header("x-forwarded-for", "203.0.113.7", true)
            .json(&json!({}))
            .send(&service(StateBuilder::new().rate_limiter(limiter)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::TOO_MANY_REQUESTS));
        assert!(res.headers().contains_key("retry-after"));

        Ok(())
    }
}
