//! Request and response bodies shared across resources.

use krua_app::domain::{localized::LocalizedText, orders::models::Address};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Copy in English and Thai.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct LocalizedTextBody {
    pub en: String,

    /// Falls back to the English copy when blank
    #[serde(default)]
    pub th: String,
}

impl From<LocalizedText> for LocalizedTextBody {
    fn from(text: LocalizedText) -> Self {
        Self {
            en: text.en,
            th: text.th,
        }
    }
}

impl From<LocalizedTextBody> for LocalizedText {
    fn from(body: LocalizedTextBody) -> Self {
        LocalizedText::new(body.en, body.th)
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddressBody {
    pub recipient: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<Address> for AddressBody {
    fn from(address: Address) -> Self {
        Self {
            recipient: address.recipient,
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            province: address.province,
            postal_code: address.postal_code,
            country: address.country,
            phone: address.phone,
        }
    }
}

impl From<AddressBody> for Address {
    fn from(body: AddressBody) -> Self {
        Self {
            recipient: body.recipient,
            line1: body.line1,
            line2: body.line2,
            city: body.city,
            province: body.province,
            postal_code: body.postal_code,
            country: body.country,
            phone: body.phone,
        }
    }
}
