//! Security audit trail.
//!
//! Records who did what to whom on the security-sensitive paths. Writes are
//! best-effort: a failed write is logged and the caller carries on.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use sqlx::query;
use tracing::warn;
use uuid::Uuid;

use crate::{auth::AuthUserUuid, database::Db};

const RECORD_SECURITY_EVENT_SQL: &str = include_str!("sql/record_security_event.sql");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEventKind {
    AuthenticationFailed,
    AccessDenied,
    UserDeleted,
    OrphanLinked,
    RoleGranted,
    RoleRevoked,
}

impl SecurityEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AccessDenied => "access_denied",
            Self::UserDeleted => "user_deleted",
            Self::OrphanLinked => "orphan_linked",
            Self::RoleGranted => "role_granted",
            Self::RoleRevoked => "role_revoked",
        }
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityEvent {
    pub kind: SecurityEventKind,

    /// The acting user, when known.
    pub user: Option<AuthUserUuid>,

    /// The record acted upon.
    pub subject: Option<Uuid>,

    pub detail: Value,
    pub remote_addr: Option<String>,
}

impl SecurityEvent {
    #[must_use]
    pub fn new(kind: SecurityEventKind) -> Self {
        Self {
            kind,
            user: None,
            subject: None,
            detail: Value::Object(serde_json::Map::new()),
            remote_addr: None,
        }
    }

    #[must_use]
    pub fn user(mut self, user: AuthUserUuid) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<Uuid>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    #[must_use]
    pub fn remote_addr(mut self, remote_addr: Option<String>) -> Self {
        self.remote_addr = remote_addr;
        self
    }
}

#[derive(Debug, Clone)]
pub struct PgAuditService {
    db: Db,
}

impl PgAuditService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditService for PgAuditService {
    async fn record(&self, event: SecurityEvent) {
        let result = query(RECORD_SECURITY_EVENT_SQL)
            .bind(Uuid::now_v7())
            .bind(event.kind.as_str())
            .bind(event.user.map(AuthUserUuid::into_uuid))
            .bind(event.subject)
            .bind(&event.detail)
            .bind(event.remote_addr.as_deref())
            .execute(self.db.pool())
            .await;

        if let Err(error) = result {
            warn!(%error, event = %event.kind, "failed to write security audit event");
        }
    }
}

#[automock]
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Append an event to the audit trail. Never fails the caller.
    async fn record(&self, event: SecurityEvent);
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[test]
    fn builder_sets_fields() {
        let user = AuthUserUuid::new();
        let subject = Uuid::now_v7();

        let event = SecurityEvent::new(SecurityEventKind::RoleGranted)
            .user(user)
            .subject(subject)
            .detail(json!({ "role": "admin" }))
            .remote_addr(Some("10.0.0.1".to_string()));

        assert_eq!(event.user, Some(user));
        assert_eq!(event.subject, Some(subject));
        assert_eq!(event.detail["role"], "admin");
        assert_eq!(event.kind.to_string(), "role_granted");
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn record_writes_a_row() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.audit
            .record(SecurityEvent::new(SecurityEventKind::AccessDenied).detail(json!({ "path": "/admin" })))
            .await;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM security_audit_log WHERE event = 'access_denied'",
        )
        .fetch_one(ctx.db.pool())
        .await?;

        assert_eq!(count, 1);

        Ok(())
    }
}
