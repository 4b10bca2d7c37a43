//! State

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::{
    auth::{FirebaseTokenVerifier, TokenVerifier},
    config::ServerConfig,
    credentials::{CredentialsError, ServiceAccountKey},
    firestore::{FirestoreClient, FirestoreError},
    orders::{FirestoreOrdersRepository, OrdersRepository},
    products::{FirestoreProductsRepository, ProductsRepository},
};

/// The document store handles, grouped so a degraded startup leaves them
/// absent as one unit.
pub(crate) struct Database {
    pub(crate) products: Arc<dyn ProductsRepository>,
    pub(crate) orders: Arc<dyn OrdersRepository>,
}

#[derive(Debug, Error)]
#[error("database not initialized")]
pub(crate) struct DatabaseUnavailable;

#[derive(Debug, Error)]
enum InitError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Store(#[from] FirestoreError),
}

pub(crate) struct State {
    database: Option<Database>,
    verifier: Option<Arc<dyn TokenVerifier>>,
}

impl State {
    pub(crate) fn new(
        database: Option<Database>,
        verifier: Option<Arc<dyn TokenVerifier>>,
    ) -> Self {
        Self { database, verifier }
    }

    /// Build the shared state from configuration.
    ///
    /// Credential or client failures are deliberately non-fatal: the server
    /// starts anyway and every affected request reports the degradation.
    pub(crate) fn initialize(config: &ServerConfig) -> Arc<Self> {
        match Self::connect(config) {
            Ok(state) => {
                info!("document store and identity verifier initialized");

                Arc::new(state)
            }
            Err(init_error) => {
                error!("failed to initialize document store: {init_error}");

                Arc::new(Self::new(None, None))
            }
        }
    }

    fn connect(config: &ServerConfig) -> Result<Self, InitError> {
        let key = ServiceAccountKey::load(&config.credentials_file)?;
        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(FirebaseTokenVerifier::new(&key.project_id));
        let client = Arc::new(FirestoreClient::connect(key)?);

        Ok(Self::new(
            Some(Database {
                products: Arc::new(FirestoreProductsRepository::new(client.clone())),
                orders: Arc::new(FirestoreOrdersRepository::new(client)),
            }),
            Some(verifier),
        ))
    }

    /// The document store handles, or the degradation error for handlers to
    /// wrap into their own failure message.
    pub(crate) fn database(&self) -> Result<&Database, DatabaseUnavailable> {
        self.database.as_ref().ok_or(DatabaseUnavailable)
    }

    pub(crate) fn verifier(&self) -> Option<&Arc<dyn TokenVerifier>> {
        self.verifier.as_ref()
    }
}
