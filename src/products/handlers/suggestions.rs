//! Offer-suggestion Handler
//!
//! `GET /api/offer_suggestions` — products that have never appeared in an
//! order and are not already on offer. Candidates are the set difference
//! between all product ids and the ids referenced by order line items,
//! taken in ascending id order, capped at five before the per-product
//! existence and offer checks.

use std::{collections::BTreeSet, sync::Arc};

use salvo::prelude::*;

use crate::{errors::ApiError, extensions::*, products::Product, products::errors, state::State};

const MAX_SUGGESTIONS: usize = 5;

#[salvo::handler]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<Product>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let database = state.database().map_err(errors::generating_suggestions)?;

    let all_ids: BTreeSet<String> = database
        .products
        .get_product_ids()
        .await
        .map_err(errors::generating_suggestions)?
        .into_iter()
        .collect();

    let orders = database
        .orders
        .get_orders()
        .await
        .map_err(errors::generating_suggestions)?;

    let sold_ids: BTreeSet<String> = orders
        .into_iter()
        .flat_map(|order| order.items)
        .map(|item| item.product_id)
        .collect();

    let mut suggestions = Vec::new();

    for id in all_ids.difference(&sold_ids).take(MAX_SUGGESTIONS) {
        let product = database
            .products
            .get_product(id)
            .await
            .map_err(errors::generating_suggestions)?;

        // The catalog may have moved under us; skip ids that vanished and
        // anything that is already an offer.
        match product {
            Some(product) if !product.on_offer() => suggestions.push(product),
            _ => {}
        }
    }

    Ok(Json(suggestions))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        orders::MockOrdersRepository,
        products::MockProductsRepository,
        test_helpers::{
            make_offer_product, make_order, make_product, state_service, state_with,
        },
    };

    use super::*;

    fn make_service(products: MockProductsRepository, orders: MockOrdersRepository) -> Service {
        state_service(
            state_with(products, orders),
            Router::with_path("api/offer_suggestions").get(handler),
        )
    }

    #[tokio::test]
    async fn test_unsold_products_are_suggested_in_id_order() -> TestResult {
        let mut products = MockProductsRepository::new();
        let mut orders = MockOrdersRepository::new();

        products.expect_get_product_ids().once().return_once(|| {
            Ok(vec!["p3".to_string(), "p1".to_string(), "p2".to_string()])
        });

        orders
            .expect_get_orders()
            .once()
            .return_once(|| Ok(vec![make_order(&["p2"])]));

        products
            .expect_get_product()
            .once()
            .withf(|id| id == "p1")
            .return_once(|_| Ok(Some(make_product("p1", 10.0))));

        products
            .expect_get_product()
            .once()
            .withf(|id| id == "p3")
            .return_once(|_| Ok(Some(make_product("p3", 30.0))));

        let response: Vec<Product> =
            TestClient::get("http://example.com/api/offer_suggestions")
                .send(&make_service(products, orders))
                .await
                .take_json()
                .await?;

        let ids: Vec<&str> = response.iter().map(|product| product.id.as_str()).collect();

        assert_eq!(ids, ["p1", "p3"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_existing_offers_and_missing_products_are_skipped() -> TestResult {
        let mut products = MockProductsRepository::new();
        let mut orders = MockOrdersRepository::new();

        products.expect_get_product_ids().once().return_once(|| {
            Ok(vec!["p1".to_string(), "p2".to_string(), "p3".to_string()])
        });

        orders.expect_get_orders().once().return_once(|| Ok(vec![]));

        products
            .expect_get_product()
            .once()
            .withf(|id| id == "p1")
            .return_once(|_| Ok(Some(make_offer_product("p1", 100.0, 10.0))));

        products
            .expect_get_product()
            .once()
            .withf(|id| id == "p2")
            .return_once(|_| Ok(None));

        products
            .expect_get_product()
            .once()
            .withf(|id| id == "p3")
            .return_once(|_| Ok(Some(make_product("p3", 30.0))));

        let response: Vec<Product> =
            TestClient::get("http://example.com/api/offer_suggestions")
                .send(&make_service(products, orders))
                .await
                .take_json()
                .await?;

        let ids: Vec<&str> = response.iter().map(|product| product.id.as_str()).collect();

        assert_eq!(ids, ["p3"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_at_most_five_candidates_are_considered() -> TestResult {
        let mut products = MockProductsRepository::new();
        let mut orders = MockOrdersRepository::new();

        products.expect_get_product_ids().once().return_once(|| {
            Ok((1..=8).map(|n| format!("p{n}")).collect())
        });

        orders.expect_get_orders().once().return_once(|| Ok(vec![]));

        // Only the first five ids in order are ever fetched.
        for id in ["p1", "p2", "p3", "p4", "p5"] {
            products
                .expect_get_product()
                .once()
                .withf(move |candidate| candidate == id)
                .return_once(move |_| Ok(Some(make_product(id, 10.0))));
        }

        let response: Vec<Product> =
            TestClient::get("http://example.com/api/offer_suggestions")
                .send(&make_service(products, orders))
                .await
                .take_json()
                .await?;

        assert_eq!(response.len(), 5, "suggestions are capped at five");

        Ok(())
    }

    #[tokio::test]
    async fn test_everything_sold_yields_no_suggestions() -> TestResult {
        let mut products = MockProductsRepository::new();
        let mut orders = MockOrdersRepository::new();

        products
            .expect_get_product_ids()
            .once()
            .return_once(|| Ok(vec!["p1".to_string(), "p2".to_string()]));

        orders
            .expect_get_orders()
            .once()
            .return_once(|| Ok(vec![make_order(&["p1"]), make_order(&["p2"])]));

        products.expect_get_product().never();

        let response: Vec<Product> =
            TestClient::get("http://example.com/api/offer_suggestions")
                .send(&make_service(products, orders))
                .await
                .take_json()
                .await?;

        assert!(response.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_order_fetch_failure_returns_500_with_message() -> TestResult {
        use crate::{firestore::FirestoreError, orders::OrdersRepositoryError};

        let mut products = MockProductsRepository::new();
        let mut orders = MockOrdersRepository::new();

        products
            .expect_get_product_ids()
            .once()
            .return_once(|| Ok(vec!["p1".to_string()]));

        orders.expect_get_orders().once().return_once(|| {
            Err(OrdersRepositoryError::Store(
                FirestoreError::UnexpectedResponse("status 503".to_string()),
            ))
        });

        products.expect_get_product().never();

        let mut res = TestClient::get("http://example.com/api/offer_suggestions")
            .send(&make_service(products, orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        let body = res.take_json::<serde_json::Value>().await?;
        let message = body["error"].as_str().unwrap_or_default();

        assert!(
            message.starts_with("error generating suggestions:"),
            "unexpected message: {message}"
        );

        Ok(())
    }
}
