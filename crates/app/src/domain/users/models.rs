//! User Administration Models

use serde::Serialize;

use crate::{auth::AuthUserUuid, domain::customers::models::CustomerUuid};

/// Rows that reference a user, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DependentRows {
    pub user_roles: u64,
    pub access_tokens: u64,
    pub customers: u64,
    pub orders: u64,
    pub order_items: u64,
}

/// What deleting a user would remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionPreview {
    pub user_uuid: AuthUserUuid,
    pub email: String,
    pub rows: DependentRows,
}

/// What deleting a user did remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub user_uuid: AuthUserUuid,
    pub email: String,
    pub deleted: DependentRows,
}

/// Which customer an orphaned login should be attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// An existing customer row with no login.
    Existing(CustomerUuid),

    /// A fresh customer using the login's email.
    New { name: String, phone: Option<String> },
}
