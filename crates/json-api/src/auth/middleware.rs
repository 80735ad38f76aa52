//! Auth middleware.
//!
//! [`handler`] resolves the bearer token to a principal. The `require_*` gates
//! run after it and all defer to [`authorize`], so every protected route is
//! checked the same way.

use std::sync::Arc;

use krua_app::{
    audit::{SecurityEvent, SecurityEventKind},
    auth::{AuthServiceError, Role, authorize},
};
use salvo::{http::header::AUTHORIZATION, prelude::*};
use serde_json::json;
use tracing::{error, warn};

use crate::{extensions::*, observability::request_id, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));

        return;
    };

    let Ok(state) = depot.obtain::<Arc<State>>().cloned() else {
        res.render(StatusError::internal_server_error());

        return;
    };

    let principal = match state.app.auth.authenticate_bearer(token).await {
        Ok(principal) => principal,
        Err(AuthServiceError::NotFound) => {
            let remote_addr = req.client_ip(state.rate_limiter.trusts_forwarded_for());

            warn!(remote_addr = ?remote_addr, "rejected bearer token");

            state
                .app
                .audit
                .record(
                    SecurityEvent::new(SecurityEventKind::AuthenticationFailed)
                        .detail(json!({
                            "path": req.uri().path(),
                            "request_id": request_id(depot),
                        }))
                        .remote_addr(remote_addr),
                )
                .await;

            res.render(StatusError::unauthorized().brief("Invalid access token"));

            return;
        }
        Err(source) => {
            error!("failed to authenticate access token: {source}");

            res.render(StatusError::internal_server_error());

            return;
        }
    };

    depot.insert_principal(principal);

    ctrl.call_next(req, depot, res).await;
}

/// Any signed-in customer.
#[salvo::handler]
pub(crate) async fn require_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    gate(Role::User, req, depot, res, ctrl).await;
}

#[salvo::handler]
pub(crate) async fn require_moderator(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    gate(Role::Moderator, req, depot, res, ctrl).await;
}

#[salvo::handler]
pub(crate) async fn require_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    gate(Role::Admin, req, depot, res, ctrl).await;
}

async fn gate(
    required: Role,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Ok(state) = depot.obtain::<Arc<State>>().cloned() else {
        res.render(StatusError::internal_server_error());

        return;
    };

    let principal = match depot.principal_or_401() {
        Ok(principal) => principal.clone(),
        Err(unauthorized) => {
            res.render(unauthorized);

            return;
        }
    };

    if let Err(denied) = authorize(&principal, required, state.access_policy) {
        let path = req.uri().path().to_owned();

        warn!(
            user_uuid = %principal.user_uuid,
            %required,
            %denied,
            path = %path,
            "access denied"
        );

        state
            .app
            .audit
            .record(
                SecurityEvent::new(SecurityEventKind::AccessDenied)
                    .user(principal.user_uuid)
                    .detail(json!({
                        "required": required.as_str(),
                        "reason": denied.to_string(),
                        "path": path,
                        "request_id": request_id(depot),
                    }))
                    .remote_addr(req.client_ip(state.rate_limiter.trusts_forwarded_for())),
            )
            .await;

        res.render(StatusError::forbidden().brief(denied.to_string()));

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
