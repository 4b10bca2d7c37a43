//! All-products Handler
//!
//! `GET /api/get_all_products` — every product in the catalog as a bare
//! JSON array, each record carrying its document key as `id`.

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::ApiError, extensions::*, products::Product, products::errors, state::State};

#[salvo::handler]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<Product>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let database = state.database().map_err(errors::retrieving_products)?;

    let products = database
        .products
        .get_products()
        .await
        .map_err(errors::retrieving_products)?;

    Ok(Json(products))
}
