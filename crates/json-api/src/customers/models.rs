//! Customer bodies

use std::string::ToString;

use krua::language::Language;
use krua_app::domain::customers::models::Customer;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extensions::*;

/// Profile fields shared by create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,

    /// `en` or `th`; defaults to English
    #[serde(default)]
    pub preferred_language: Option<String>,
}

impl CustomerDetails {
    pub(crate) fn language(&self) -> Result<Language, StatusError> {
        self.preferred_language
            .as_deref()
            .map(str::parse::<Language>)
            .transpose()
            .or_400("Unsupported language")
            .map(Option::unwrap_or_default)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerResponse {
    pub uuid: Uuid,
    pub auth_user_uuid: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_language: String,
    pub total_orders: u32,

    /// Lifetime spend in minor units
    pub total_spent: i64,

    pub last_order_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            uuid: customer.uuid.into(),
            auth_user_uuid: customer.auth_user_uuid.map(Into::into),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            preferred_language: customer.preferred_language.code().to_string(),
            total_orders: customer.total_orders,
            total_spent: customer.total_spent,
            last_order_at: customer.last_order_at.as_ref().map(ToString::to_string),
            created_at: customer.created_at.to_string(),
            updated_at: customer.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomersResponse {
    pub customers: Vec<CustomerResponse>,
}

impl From<Vec<Customer>> for CustomersResponse {
    fn from(customers: Vec<Customer>) -> Self {
        Self {
            customers: customers.into_iter().map(Into::into).collect(),
        }
    }
}
