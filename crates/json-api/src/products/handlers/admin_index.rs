//! Back-office Product Index Handler

use std::sync::Arc;

use krua_app::domain::products::models::ProductFilter;
use salvo::prelude::*;

use crate::{
    extensions::*,
    products::{errors::into_status_error, models::ProductsResponse},
    state::State,
};

/// Lists every product, including inactive ones.
#[endpoint(
    tags("products", "admin"),
    summary = "List All Products",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let products = state
        .app
        .products
        .list_products(ProductFilter::back_office())
        .await
        .map_err(into_status_error)?;

    Ok(Json(products.into()))
}
