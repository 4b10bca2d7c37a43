//! Products Repository

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde_json::json;
use thiserror::Error;

use crate::{
    firestore::{Document, FirestoreClient, FirestoreError, value},
    products::models::{OfferUpdate, Product},
};

const PRODUCTS_COLLECTION: &str = "products";
const OFFER_FIELDS: [&str; 3] = ["isOffer", "offerPrice", "discountPercentage"];

#[derive(Debug, Error)]
pub(crate) enum ProductsRepositoryError {
    #[error(transparent)]
    Store(#[from] FirestoreError),

    #[error("malformed product document: {0}")]
    Decode(#[from] serde_json::Error),
}

#[automock]
#[async_trait]
pub(crate) trait ProductsRepository: Send + Sync {
    /// Every product in the catalog.
    async fn get_products(&self) -> Result<Vec<Product>, ProductsRepositoryError>;

    /// Products with `isOffer == true`, filtered store-side.
    async fn get_offers(&self) -> Result<Vec<Product>, ProductsRepositoryError>;

    /// One product by document key; `None` when it does not exist.
    async fn get_product(&self, id: &str)
    -> Result<Option<Product>, ProductsRepositoryError>;

    /// Keys of every product document.
    async fn get_product_ids(&self) -> Result<Vec<String>, ProductsRepositoryError>;

    /// Stage the offer trio on each listed product and commit as one
    /// all-or-nothing batch.
    async fn apply_offers(&self, offers: &[OfferUpdate])
    -> Result<(), ProductsRepositoryError>;

    /// Delete the offer trio from one product. The store rejects the update
    /// when the document does not exist.
    async fn clear_offer(&self, product_id: &str) -> Result<(), ProductsRepositoryError>;
}

#[derive(Clone)]
pub(crate) struct FirestoreProductsRepository {
    client: Arc<FirestoreClient>,
}

impl FirestoreProductsRepository {
    #[must_use]
    pub(crate) fn new(client: Arc<FirestoreClient>) -> Self {
        Self { client }
    }

    fn offer_write(&self, offer: &OfferUpdate) -> serde_json::Value {
        json!({
            "update": {
                "name": self.client.document_name(PRODUCTS_COLLECTION, &offer.product_id),
                "fields": {
                    "isOffer": value::encode(&json!(true)),
                    "offerPrice": value::encode(&json!(offer.offer_price)),
                    "discountPercentage": value::encode(&json!(offer.discount_percentage)),
                },
            },
            "updateMask": { "fieldPaths": OFFER_FIELDS },
            "currentDocument": { "exists": true },
        })
    }
}

fn decode_product(document: &Document) -> Result<Product, ProductsRepositoryError> {
    let mut product: Product = serde_json::from_value(document.to_json())?;
    product.id = document.id().to_string();

    Ok(product)
}

#[async_trait]
impl ProductsRepository for FirestoreProductsRepository {
    async fn get_products(&self) -> Result<Vec<Product>, ProductsRepositoryError> {
        self.client
            .list_documents(PRODUCTS_COLLECTION)
            .await?
            .iter()
            .map(decode_product)
            .collect()
    }

    async fn get_offers(&self) -> Result<Vec<Product>, ProductsRepositoryError> {
        self.client
            .query_equals(PRODUCTS_COLLECTION, "isOffer", &json!(true))
            .await?
            .iter()
            .map(decode_product)
            .collect()
    }

    async fn get_product(
        &self,
        id: &str,
    ) -> Result<Option<Product>, ProductsRepositoryError> {
        self.client
            .get_document(PRODUCTS_COLLECTION, id)
            .await?
            .as_ref()
            .map(decode_product)
            .transpose()
    }

    async fn get_product_ids(&self) -> Result<Vec<String>, ProductsRepositoryError> {
        Ok(self
            .client
            .list_documents(PRODUCTS_COLLECTION)
            .await?
            .iter()
            .map(|document| document.id().to_string())
            .collect())
    }

    async fn apply_offers(
        &self,
        offers: &[OfferUpdate],
    ) -> Result<(), ProductsRepositoryError> {
        let writes = offers.iter().map(|offer| self.offer_write(offer)).collect();

        Ok(self.client.commit(writes).await?)
    }

    async fn clear_offer(&self, product_id: &str) -> Result<(), ProductsRepositoryError> {
        let write = json!({
            "update": {
                "name": self.client.document_name(PRODUCTS_COLLECTION, product_id),
                "fields": {},
            },
            "updateMask": { "fieldPaths": OFFER_FIELDS },
            "currentDocument": { "exists": true },
        });

        Ok(self.client.commit(vec![write]).await?)
    }
}
