//! Remove-offer Handler
//!
//! `POST /api/remove_offer` — delete the offer trio from one product. No
//! existence check: updating a document that is not there is the store's
//! error to raise, and it surfaces as a 500 like any other failure.

use std::sync::Arc;

use salvo::prelude::*;
use serde::Deserialize;

use crate::{errors::ApiError, extensions::*, products::errors, state::State};

use super::MutationResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoveOfferRequest {
    #[serde(default)]
    product_id: Option<String>,
}

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MutationResponse>, ApiError> {
    let request = req
        .parse_json::<RemoveOfferRequest>()
        .await
        .map_err(|_parse_error| ApiError::InvalidRequest("product id not provided"))?;

    let product_id = request
        .product_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::InvalidRequest("product id not provided"))?;

    let state = depot.obtain_or_500::<Arc<State>>()?;
    let database = state.database().map_err(errors::removing_offer)?;

    database
        .products
        .clear_offer(&product_id)
        .await
        .map_err(errors::removing_offer)?;

    Ok(Json(MutationResponse::new("offer removed")))
}
