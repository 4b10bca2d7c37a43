//! Create-offers Handler
//!
//! `POST /api/create_offers` — stage the offer trio on each listed product
//! and commit the lot as one atomic batch. Ids that match no document are
//! skipped without failing the request.

use std::sync::Arc;

use salvo::prelude::*;
use serde::Deserialize;

use crate::{
    errors::ApiError,
    extensions::*,
    products::{OfferUpdate, errors},
    state::State,
};

use super::MutationResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOffersRequest {
    #[serde(default)]
    product_ids: Option<Vec<String>>,
    #[serde(default)]
    discount_percentage: Option<f64>,
}

impl CreateOffersRequest {
    /// A usable request names at least one product and a non-zero discount.
    /// Zero is rejected along with absence, as the original service did.
    fn validate(self) -> Result<(Vec<String>, f64), ApiError> {
        let product_ids = self
            .product_ids
            .filter(|ids| !ids.is_empty())
            .ok_or(ApiError::InvalidRequest("invalid data"))?;

        let discount = self
            .discount_percentage
            .filter(|discount| *discount != 0.0)
            .ok_or(ApiError::InvalidRequest("invalid data"))?;

        Ok((product_ids, discount))
    }
}

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MutationResponse>, ApiError> {
    let request = req
        .parse_json::<CreateOffersRequest>()
        .await
        .map_err(|_parse_error| ApiError::InvalidRequest("invalid data"))?;

    let (product_ids, discount) = request.validate()?;

    let state = depot.obtain_or_500::<Arc<State>>()?;
    let database = state.database().map_err(errors::creating_offers)?;

    let mut offers = Vec::new();

    for product_id in product_ids {
        let Some(product) = database
            .products
            .get_product(&product_id)
            .await
            .map_err(errors::creating_offers)?
        else {
            continue;
        };

        let price = product.price.unwrap_or(0.0);

        offers.push(OfferUpdate {
            product_id,
            offer_price: price * (1.0 - discount / 100.0),
            discount_percentage: discount,
        });
    }

    database
        .products
        .apply_offers(&offers)
        .await
        .map_err(errors::creating_offers)?;

    Ok(Json(MutationResponse::new("offers created")))
}
