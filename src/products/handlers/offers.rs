//! Current-offers Handler
//!
//! `GET /api/get_offers` — the products with `isOffer == true`, filtered by
//! the store so the result is always a subset of the full catalog.

use std::sync::Arc;

use salvo::prelude::*;

use crate::{errors::ApiError, extensions::*, products::Product, products::errors, state::State};

#[salvo::handler]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<Product>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let database = state.database().map_err(errors::retrieving_offers)?;

    let offers = database
        .products
        .get_offers()
        .await
        .map_err(errors::retrieving_offers)?;

    Ok(Json(offers))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        firestore::FirestoreError,
        products::{MockProductsRepository, ProductsRepositoryError},
        test_helpers::{make_offer_product, products_service},
    };

    use super::*;

    fn make_service(products: MockProductsRepository) -> Service {
        products_service(products, Router::with_path("api/get_offers").get(handler))
    }

    #[tokio::test]
    async fn test_offers_returns_only_offer_records() -> TestResult {
        let mut products = MockProductsRepository::new();

        products
            .expect_get_offers()
            .once()
            .return_once(|| Ok(vec![make_offer_product("p1", 100.0, 50.0)]));

        let response: Vec<Product> = TestClient::get("http://example.com/api/get_offers")
            .send(&make_service(products))
            .await
            .take_json()
            .await?;

        assert_eq!(response.len(), 1, "expected one offer");
        assert_eq!(response[0].id, "p1");
        assert_eq!(response[0].is_offer, Some(true));
        assert_eq!(response[0].offer_price, Some(50.0));

        Ok(())
    }

    #[tokio::test]
    async fn test_offers_failure_uses_its_own_message() -> TestResult {
        let mut products = MockProductsRepository::new();

        products.expect_get_offers().once().return_once(|| {
            Err(ProductsRepositoryError::Store(
                FirestoreError::UnexpectedResponse("status 500".to_string()),
            ))
        });

        let mut res = TestClient::get("http://example.com/api/get_offers")
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        let body = res.take_json::<serde_json::Value>().await?;
        let message = body["error"].as_str().unwrap_or_default();

        assert!(
            message.starts_with("error retrieving offers:"),
            "unexpected message: {message}"
        );

        Ok(())
    }
}
