//! User administration bodies

use krua_app::{
    auth::AuthUser,
    domain::users::models::{DeletionPreview, DeletionReport, DependentRows},
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AuthUserResponse {
    pub uuid: Uuid,
    pub email: String,
    pub created_at: String,
}

impl From<AuthUser> for AuthUserResponse {
    fn from(user: AuthUser) -> Self {
        Self {
            uuid: user.uuid.into(),
            email: user.email,
            created_at: user.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrphanedUsersResponse {
    pub users: Vec<AuthUserResponse>,
}

impl From<Vec<AuthUser>> for OrphanedUsersResponse {
    fn from(users: Vec<AuthUser>) -> Self {
        Self {
            users: users.into_iter().map(Into::into).collect(),
        }
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct DependentRowsResponse {
    pub user_roles: u64,
    pub access_tokens: u64,
    pub customers: u64,
    pub orders: u64,
    pub order_items: u64,
}

impl From<DependentRows> for DependentRowsResponse {
    fn from(rows: DependentRows) -> Self {
        Self {
            user_roles: rows.user_roles,
            access_tokens: rows.access_tokens,
            customers: rows.customers,
            orders: rows.orders,
            order_items: rows.order_items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeletionPreviewResponse {
    pub user_uuid: Uuid,
    pub email: String,
    pub rows: DependentRowsResponse,
}

impl From<DeletionPreview> for DeletionPreviewResponse {
    fn from(preview: DeletionPreview) -> Self {
        Self {
            user_uuid: preview.user_uuid.into(),
            email: preview.email,
            rows: preview.rows.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeletionReportResponse {
    pub user_uuid: Uuid,
    pub email: String,
    pub deleted: DependentRowsResponse,
}

impl From<DeletionReport> for DeletionReportResponse {
    fn from(report: DeletionReport) -> Self {
        Self {
            user_uuid: report.user_uuid.into(),
            email: report.email,
            deleted: report.deleted.into(),
        }
    }
}
