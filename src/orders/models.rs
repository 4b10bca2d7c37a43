//! Order Models

use serde::Deserialize;

/// An order document. Only the line items are read; an order with no
/// `items` field counts as empty.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Order {
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// One order line. `productId` is a foreign reference to a product
/// document; it is not enforced by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItem {
    pub product_id: String,
}
