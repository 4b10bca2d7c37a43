//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};
use serde_json::Map;

use crate::{
    auth::{MockTokenVerifier, TokenVerifier},
    orders::{MockOrdersRepository, Order, OrderItem},
    products::{MockProductsRepository, Product},
    state::{Database, State},
};

pub(crate) fn make_product(id: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        price: Some(price),
        is_offer: None,
        offer_price: None,
        discount_percentage: None,
        extra: Map::new(),
    }
}

pub(crate) fn make_offer_product(id: &str, price: f64, discount: f64) -> Product {
    Product {
        is_offer: Some(true),
        offer_price: Some(price * (1.0 - discount / 100.0)),
        discount_percentage: Some(discount),
        ..make_product(id, price)
    }
}

pub(crate) fn make_order(product_ids: &[&str]) -> Order {
    Order {
        items: product_ids
            .iter()
            .map(|id| OrderItem {
                product_id: (*id).to_string(),
            })
            .collect(),
    }
}

fn strict_products_mock() -> MockProductsRepository {
    let mut products = MockProductsRepository::new();

    products.expect_get_products().never();
    products.expect_get_offers().never();
    products.expect_get_product().never();
    products.expect_get_product_ids().never();
    products.expect_apply_offers().never();
    products.expect_clear_offer().never();

    products
}

fn strict_orders_mock() -> MockOrdersRepository {
    let mut orders = MockOrdersRepository::new();

    orders.expect_get_orders().never();

    orders
}

pub(crate) fn state_with(
    products: MockProductsRepository,
    orders: MockOrdersRepository,
) -> Arc<State> {
    Arc::new(State::new(
        Some(Database {
            products: Arc::new(products),
            orders: Arc::new(orders),
        }),
        None,
    ))
}

pub(crate) fn state_without_verifier() -> Arc<State> {
    state_with(strict_products_mock(), strict_orders_mock())
}

pub(crate) fn state_service(state: Arc<State>, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(route))
}

/// Service over a products mock; the orders side stays strictly untouched.
pub(crate) fn products_service(products: MockProductsRepository, route: Router) -> Service {
    state_service(state_with(products, strict_orders_mock()), route)
}

/// Service whose state has no database at all (degraded startup).
pub(crate) fn degraded_service(route: Router) -> Service {
    state_service(Arc::new(State::new(None, None)), route)
}

/// Service with the auth middleware wired to a mock verifier and strictly
/// untouched repositories behind it.
pub(crate) fn service_with_verifier(verifier: MockTokenVerifier, route: Router) -> Service {
    let verifier: Arc<dyn TokenVerifier> = Arc::new(verifier);

    let state = Arc::new(State::new(
        Some(Database {
            products: Arc::new(strict_products_mock()),
            orders: Arc::new(strict_orders_mock()),
        }),
        Some(verifier),
    ));

    state_service(state, route)
}
