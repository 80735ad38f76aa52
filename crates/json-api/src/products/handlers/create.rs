//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use krua_app::domain::products::models::NewProduct;

use crate::{
    extensions::*,
    products::{errors::into_status_error, models::ProductResponse},
    schemas::LocalizedTextBody,
    state::State,
};

fn default_active() -> bool {
    true
}

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    pub uuid: Uuid,
    pub sku: String,
    pub name: LocalizedTextBody,
    #[serde(default)]
    pub description: LocalizedTextBody,

    /// VAT-inclusive price in minor units
    pub price: u64,

    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub stock: u32,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        NewProduct {
            uuid: request.uuid.into(),
            sku: request.sku.trim().to_string(),
            name: request.name.into(),
            description: request.description.into(),
            price: request.price,
            category: request.category.trim().to_string(),
            active: request.active,
            stock: request.stock,
        }
    }
}

/// Create Product Handler
#[endpoint(
    tags("products", "admin"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty, sku = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(request.uuid));
    span.record("sku", request.sku.as_str());

    let product = state
        .app
        .products
        .create_product(request.into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use krua_app::{
        auth::Role,
        domain::{
            localized::LocalizedText,
            products::{MockProductsService, ProductsServiceError, models::ProductUuid},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{StateBuilder, make_product, principal, service_as};

    use super::*;

    fn make_service(products: MockProductsService) -> Service {
        service_as(
            StateBuilder::new().products(products).build(),
            principal(&[Role::Admin]),
            Router::with_path("products").post(handler),
        )
    }

    fn body(uuid: ProductUuid) -> Value {
        json!({
            "uuid": uuid.into_uuid(),
            "sku": " KR-PASTE-01 ",
            "name": { "en": "Green curry paste", "th": "พริกแกงเขียวหวาน" },
            "price": 4500,
            "category": "pastes",
            "stock": 12
        })
    }

    #[tokio::test]
    async fn test_create_product_success() -> TestResult {
        let uuid = ProductUuid::new();

        let mut products = MockProductsService::new();

        products
            .expect_create_product()
            .once()
            .withf(move |new| {
                *new == NewProduct {
                    uuid,
                    sku: "KR-PASTE-01".to_string(),
                    name: LocalizedText::new("Green curry paste", "พริกแกงเขียวหวาน"),
                    description: LocalizedText::default(),
                    price: 4_500,
                    category: "pastes".to_string(),
                    active: true,
                    stock: 12,
                }
            })
            .return_once(move |_| Ok(make_product(uuid)));

        let mut res = TestClient::post("http://example.com/products")
            .json(&body(uuid))
            .send(&make_service(products))
            .await;

        let created: ProductResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/products/{uuid}").as_str()));
        assert_eq!(created.uuid, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_sku_returns_409() -> TestResult {
        let uuid = ProductUuid::new();

        let mut products = MockProductsService::new();

        products
            .expect_create_product()
            .once()
            .return_once(|_| Err(ProductsServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/products")
            .json(&body(uuid))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_values_return_400() -> TestResult {
        let uuid = ProductUuid::new();

        let mut products = MockProductsService::new();

        products
            .expect_create_product()
            .once()
            .return_once(|_| Err(ProductsServiceError::InvalidData));

        let res = TestClient::post("http://example.com/products")
            .json(&body(uuid))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
