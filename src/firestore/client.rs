//! Firestore document client.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::{
    credentials::ServiceAccountKey,
    firestore::{oauth::AccessTokens, value},
};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Documents are listed in pages; this is the page size requested per call.
const LIST_PAGE_SIZE: u32 = 300;

/// Errors that can occur when communicating with Firestore.
#[derive(Debug, Error)]
pub(crate) enum FirestoreError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service-account key could not be used to sign the token request.
    #[error("invalid service account key: {0}")]
    Credentials(#[from] jsonwebtoken::errors::Error),

    /// Firestore returned a non-2xx response or unexpected body.
    #[error("unexpected response from document store: {0}")]
    UnexpectedResponse(String),
}

/// A raw Firestore document: full resource name plus typed fields.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Document {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) fields: Map<String, Value>,
}

impl Document {
    /// The document key: the last segment of the resource name.
    pub(crate) fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Decode the typed fields into a plain JSON object.
    pub(crate) fn to_json(&self) -> Value {
        value::decode_fields(&self.fields)
    }
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryResult {
    document: Option<Document>,
}

pub(crate) struct FirestoreClient {
    http: reqwest::Client,
    tokens: AccessTokens,
    /// `projects/<project>/databases/(default)/documents`
    documents_root: String,
}

impl FirestoreClient {
    /// Build a client for the project named by the service-account key.
    ///
    /// # Errors
    ///
    /// Returns an error when the key's private key PEM is malformed.
    pub(crate) fn connect(key: ServiceAccountKey) -> Result<Self, FirestoreError> {
        let http = reqwest::Client::new();
        let documents_root = format!(
            "projects/{}/databases/(default)/documents",
            key.project_id
        );
        let tokens = AccessTokens::new(key, http.clone())?;

        Ok(Self {
            http,
            tokens,
            documents_root,
        })
    }

    /// Full resource name for a document within a collection.
    pub(crate) fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root)
    }

    fn url(&self, suffix: &str) -> String {
        format!("{FIRESTORE_BASE_URL}/{}{suffix}", self.documents_root)
    }

    /// Fetch every document of a collection, following pagination.
    pub(crate) async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<Document>, FirestoreError> {
        let token = self.tokens.bearer().await?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url(&format!("/{collection}")))
                .bearer_auth(&token)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);

            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let response = request.send().await?;

            if !response.status().is_success() {
                return Err(Self::unexpected(response).await);
            }

            let page: ListDocumentsResponse = response.json().await?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }

    /// Fetch one document. Returns `None` when it does not exist.
    pub(crate) async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let token = self.tokens.bearer().await?;

        let response = self
            .http
            .get(self.url(&format!("/{collection}/{id}")))
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }

        Ok(Some(response.json().await?))
    }

    /// Run an equality query against one collection.
    pub(crate) async fn query_equals(
        &self,
        collection: &str,
        field: &str,
        equals: &Value,
    ) -> Result<Vec<Document>, FirestoreError> {
        let token = self.tokens.bearer().await?;

        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": value::encode(equals),
                    }
                }
            }
        });

        let response = self
            .http
            .post(self.url(":runQuery"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }

        let results: Vec<RunQueryResult> = response.json().await?;

        Ok(results
            .into_iter()
            .filter_map(|result| result.document)
            .collect())
    }

    /// Apply a set of writes as one all-or-nothing batch.
    pub(crate) async fn commit(&self, writes: Vec<Value>) -> Result<(), FirestoreError> {
        let token = self.tokens.bearer().await?;

        let response = self
            .http
            .post(self.url(":commit"))
            .bearer_auth(&token)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }

        Ok(())
    }

    async fn unexpected(response: reqwest::Response) -> FirestoreError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        FirestoreError::UnexpectedResponse(format!("status {status}: {text}"))
    }
}
