//! Delete User Handler

use std::sync::Arc;

use krua_app::audit::{SecurityEvent, SecurityEventKind};
use salvo::{oapi::extract::PathParam, prelude::*};
use serde_json::json;
use uuid::Uuid;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::DeletionReportResponse},
};

/// Delete User Handler
///
/// Removes the account with its roles, tokens, customer profile and orders in
/// one transaction. Stock from the deleted orders is not returned.
#[endpoint(
    tags("users", "admin"),
    summary = "Delete User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Rows deleted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cannot delete own account"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
    ),
)]
#[tracing::instrument(
    name = "users.delete",
    skip(user, req, depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<DeletionReportResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.principal_or_401()?.user_uuid;
    let user = user.into_inner();

    tracing::Span::current().record("user_uuid", tracing::field::display(user));

    let report = state
        .app
        .users
        .delete_user(actor, user.into())
        .await
        .map_err(into_status_error)?;

    state
        .app
        .audit
        .record(
            SecurityEvent::new(SecurityEventKind::UserDeleted)
                .user(actor)
                .subject(user)
                .detail(json!({
                    "email": report.email,
                    "deleted": report.deleted,
                }))
                .remote_addr(req.client_ip(state.rate_limiter.trusts_forwarded_for())),
        )
        .await;

    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        audit::MockAuditService,
        auth::{AuthUserUuid, Role},
        domain::users::{
            MockUsersService, UsersServiceError,
            models::{DeletionReport, DependentRows},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, TEST_USER_UUID, principal, service_as};

    use super::*;

    fn make_service(users: MockUsersService, audit: MockAuditService) -> Service {
        service_as(
            StateBuilder::new().users(users).audit(audit).build(),
            principal(&[Role::Admin]),
            Router::with_path("admin/users/{user}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_delete_user_reports_and_audits() -> TestResult {
        let user = AuthUserUuid::new();
        let deleted = DependentRows {
            user_roles: 1,
            access_tokens: 1,
            customers: 1,
            orders: 2,
            order_items: 3,
        };

        let mut users = MockUsersService::new();

        users
            .expect_delete_user()
            .once()
            .withf(move |actor, uuid| *actor == TEST_USER_UUID && *uuid == user)
            .return_once(move |_, _| {
                Ok(DeletionReport {
                    user_uuid: user,
                    email: "doomed@example.com".to_string(),
                    deleted,
                })
            });

        let mut audit = MockAuditService::new();

        audit
            .expect_record()
            .once()
            .withf(move |event| {
                event.kind == SecurityEventKind::UserDeleted
                    && event.subject == Some(user.into_uuid())
                    && event.detail.pointer("/deleted/orders") == Some(&json!(2))
            })
            .return_const(());

        let report: DeletionReportResponse =
            TestClient::delete(format!("http://example.com/admin/users/{user}"))
                .send(&make_service(users, audit))
                .await
                .take_json()
                .await?;

        assert_eq!(report.deleted.orders, 2);
        assert_eq!(report.deleted.order_items, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_self_deletion_returns_400() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_delete_user()
            .once()
            .return_once(|_, _| Err(UsersServiceError::CannotDeleteSelf));

        let res = TestClient::delete(format!("http://example.com/admin/users/{TEST_USER_UUID}"))
            .send(&make_service(users, MockAuditService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
