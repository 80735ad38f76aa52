//! Product Models

use jiff::Timestamp;

use crate::{domain::localized::LocalizedText, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub uuid: ProductUuid,
    pub sku: String,
    pub name: LocalizedText,
    pub description: LocalizedText,

    /// VAT-inclusive price in minor units
    pub price: u64,

    pub category: String,
    pub active: bool,
    pub stock: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub sku: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: u64,
    pub category: String,
    pub active: bool,
    pub stock: u32,
}

/// Product Update Model
///
/// Stock is changed through `adjust_stock` so that concurrent orders are not
/// overwritten by a stale form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub sku: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: u64,
    pub category: String,
    pub active: bool,
}

/// Which products to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Storefront listings hide inactive products.
    pub active_only: bool,

    pub category: Option<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn storefront(category: Option<String>) -> Self {
        Self {
            active_only: true,
            category,
        }
    }

    #[must_use]
    pub fn back_office() -> Self {
        Self::default()
    }
}
