//! Product Models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product document as stored in the catalog.
///
/// Only the fields this service touches are typed; everything else the
/// document carries passes through untouched. `is_offer`, `offer_price` and
/// `discount_percentage` are set and cleared together: a product either
/// carries the whole offer trio or none of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Product {
    /// Document key, injected into every returned record.
    #[serde(default)]
    pub id: String,

    /// Original price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_offer: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub(crate) fn on_offer(&self) -> bool {
        self.is_offer.unwrap_or(false)
    }
}

/// One staged offer write: the full trio for a single product.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OfferUpdate {
    pub product_id: String,
    pub offer_price: f64,
    pub discount_percentage: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_deserialize_keeps_unknown_fields() -> TestResult {
        let product: Product = serde_json::from_value(json!({
            "name": "Lamp",
            "price": 19.5,
            "isOffer": true,
            "offerPrice": 9.75,
            "discountPercentage": 50,
        }))?;

        assert_eq!(product.price, Some(19.5));
        assert!(product.on_offer());
        assert_eq!(product.extra["name"], "Lamp");

        Ok(())
    }

    #[test]
    fn test_serialize_omits_absent_offer_fields() -> TestResult {
        let product = Product {
            id: "p1".to_string(),
            price: Some(10.0),
            is_offer: None,
            offer_price: None,
            discount_percentage: None,
            extra: Map::new(),
        };

        let value = serde_json::to_value(&product)?;

        assert_eq!(value, json!({ "id": "p1", "price": 10.0 }));

        Ok(())
    }

    #[test]
    fn test_absent_is_offer_means_not_on_offer() -> TestResult {
        let product: Product = serde_json::from_value(json!({ "price": 5 }))?;

        assert!(!product.on_offer());
        assert_eq!(product.price, Some(5.0));

        Ok(())
    }
}
