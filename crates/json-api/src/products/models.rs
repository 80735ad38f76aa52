//! Product bodies

use std::string::ToString;

use krua_app::domain::products::models::Product;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schemas::LocalizedTextBody;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductResponse {
    pub uuid: Uuid,
    pub sku: String,
    pub name: LocalizedTextBody,
    pub description: LocalizedTextBody,

    /// VAT-inclusive price in minor units
    pub price: u64,

    pub category: String,
    pub active: bool,
    pub stock: u32,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            uuid: product.uuid.into(),
            sku: product.sku,
            name: product.name.into(),
            description: product.description.into(),
            price: product.price,
            category: product.category,
            active: product.active,
            stock: product.stock,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
            deleted_at: product.deleted_at.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    pub products: Vec<ProductResponse>,
}

impl From<Vec<Product>> for ProductsResponse {
    fn from(products: Vec<Product>) -> Self {
        Self {
            products: products.into_iter().map(Into::into).collect(),
        }
    }
}
