//! Customer Models

use jiff::Timestamp;
use krua::language::Language;

use crate::{auth::AuthUserUuid, uuids::TypedUuid};

/// Customer UUID
pub type CustomerUuid = TypedUuid<Customer>;

/// Customer Model
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub uuid: CustomerUuid,

    /// `None` until the customer is linked to a login.
    pub auth_user_uuid: Option<AuthUserUuid>,

    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_language: Language,
    pub total_orders: u32,

    /// Minor units
    pub total_spent: i64,

    pub last_order_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Customer Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub uuid: CustomerUuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_language: Language,
}

/// Customer Update Model
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerUpdate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_language: Language,
}
