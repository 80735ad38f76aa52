//! Role Grant and Revoke Handlers

use std::sync::Arc;

use krua_app::{
    audit::{SecurityEvent, SecurityEventKind},
    auth::Role,
};
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{extensions::*, state::State, users::errors::role_status_error};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RoleChangeResponse {
    pub user_uuid: Uuid,
    pub role: String,

    /// False when the user already had (or already lacked) the role
    pub changed: bool,
}

#[derive(Debug, Clone, Copy)]
enum RoleChange {
    Grant,
    Revoke,
}

impl RoleChange {
    const fn event(self) -> SecurityEventKind {
        match self {
            Self::Grant => SecurityEventKind::RoleGranted,
            Self::Revoke => SecurityEventKind::RoleRevoked,
        }
    }
}

async fn change_role(
    change: RoleChange,
    user: Uuid,
    role: &str,
    req: &Request,
    depot: &Depot,
) -> Result<RoleChangeResponse, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.principal_or_401()?.user_uuid;

    let role = role.parse::<Role>().or_400("Unknown role")?;

    let changed = match change {
        RoleChange::Grant => state.app.auth.grant_role(user.into(), role).await,
        RoleChange::Revoke => state.app.auth.revoke_role(user.into(), role).await,
    }
    .map_err(role_status_error)?;

    if changed {
        state
            .app
            .audit
            .record(
                SecurityEvent::new(change.event())
                    .user(actor)
                    .subject(user)
                    .detail(json!({ "role": role.as_str() }))
                    .remote_addr(req.client_ip(state.rate_limiter.trusts_forwarded_for())),
            )
            .await;
    }

    tracing::info!(user_uuid = %user, role = %role, changed, ?change, "role change");

    Ok(RoleChangeResponse {
        user_uuid: user,
        role: role.as_str().to_string(),
        changed,
    })
}

/// Grant Role Handler
#[endpoint(
    tags("users", "admin"),
    summary = "Grant Role",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Role granted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown role"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
    ),
)]
pub(crate) async fn grant(
    user: PathParam<Uuid>,
    role: PathParam<String>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<RoleChangeResponse>, StatusError> {
    change_role(
        RoleChange::Grant,
        user.into_inner(),
        &role.into_inner(),
        req,
        depot,
    )
    .await
    .map(Json)
}

/// Revoke Role Handler
#[endpoint(
    tags("users", "admin"),
    summary = "Revoke Role",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Role revoked"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown role"),
    ),
)]
pub(crate) async fn revoke(
    user: PathParam<Uuid>,
    role: PathParam<String>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<RoleChangeResponse>, StatusError> {
    change_role(
        RoleChange::Revoke,
        user.into_inner(),
        &role.into_inner(),
        req,
        depot,
    )
    .await
    .map(Json)
}

#[cfg(test)]
mod tests {
    use krua_app::{
        audit::MockAuditService,
        auth::{AuthServiceError, AuthUserUuid, MockAuthService},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, principal, service_as};

    use super::*;

    fn make_service(auth: MockAuthService, audit: MockAuditService) -> Service {
        service_as(
            StateBuilder::new().auth(auth).audit(audit).build(),
            principal(&[Role::Admin]),
            Router::with_path("admin/users/{user}/roles/{role}")
                .put(grant)
                .delete(revoke),
        )
    }

    #[tokio::test]
    async fn test_grant_role_is_audited() -> TestResult {
        let user = AuthUserUuid::new();

        let mut auth = MockAuthService::new();

        auth.expect_grant_role()
            .once()
            .withf(move |uuid, role| *uuid == user && *role == Role::Moderator)
            .return_once(|_, _| Ok(true));

        let mut audit = MockAuditService::new();

        audit
            .expect_record()
            .once()
            .withf(move |event| {
                event.kind == SecurityEventKind::RoleGranted
                    && event.subject == Some(user.into_uuid())
                    && event.detail == json!({ "role": "moderator" })
            })
            .return_const(());

        let response: RoleChangeResponse = TestClient::put(format!(
            "http://example.com/admin/users/{user}/roles/moderator"
        ))
        .send(&make_service(auth, audit))
        .await
        .take_json()
        .await?;

        assert!(response.changed);
        assert_eq!(response.role, "moderator");

        Ok(())
    }

    #[tokio::test]
    async fn test_revoking_missing_role_is_not_audited() -> TestResult {
        let user = AuthUserUuid::new();

        let mut auth = MockAuthService::new();

        auth.expect_revoke_role()
            .once()
            .withf(move |uuid, role| *uuid == user && *role == Role::Admin)
            .return_once(|_, _| Ok(false));

        let response: RoleChangeResponse =
            TestClient::delete(format!("http://example.com/admin/users/{user}/roles/admin"))
                .send(&make_service(auth, MockAuditService::new()))
                .await
                .take_json()
                .await?;

        assert!(!response.changed);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_role_returns_400() -> TestResult {
        let res = TestClient::put(format!(
            "http://example.com/admin/users/{}/roles/owner",
            Uuid::now_v7()
        ))
        .send(&make_service(MockAuthService::new(), MockAuditService::new()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_user_returns_404() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_grant_role()
            .once()
            .return_once(|_, _| Err(AuthServiceError::NotFound));

        let res = TestClient::put(format!(
            "http://example.com/admin/users/{}/roles/user",
            Uuid::now_v7()
        ))
        .send(&make_service(auth, MockAuditService::new()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
