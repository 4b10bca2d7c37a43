//! Orders Repository

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    firestore::{FirestoreClient, FirestoreError},
    orders::models::Order,
};

const ORDERS_COLLECTION: &str = "orders";

#[derive(Debug, Error)]
pub(crate) enum OrdersRepositoryError {
    #[error(transparent)]
    Store(#[from] FirestoreError),

    #[error("malformed order document: {0}")]
    Decode(#[from] serde_json::Error),
}

#[automock]
#[async_trait]
pub(crate) trait OrdersRepository: Send + Sync {
    /// Every order on record.
    async fn get_orders(&self) -> Result<Vec<Order>, OrdersRepositoryError>;
}

#[derive(Clone)]
pub(crate) struct FirestoreOrdersRepository {
    client: Arc<FirestoreClient>,
}

impl FirestoreOrdersRepository {
    #[must_use]
    pub(crate) fn new(client: Arc<FirestoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrdersRepository for FirestoreOrdersRepository {
    async fn get_orders(&self) -> Result<Vec<Order>, OrdersRepositoryError> {
        self.client
            .list_documents(ORDERS_COLLECTION)
            .await?
            .iter()
            .map(|document| Ok(serde_json::from_value(document.to_json())?))
            .collect()
    }
}
