//! OAuth2 service-account token exchange.
//!
//! Mints an RS256 `jwt-bearer` assertion from the service-account key and
//! trades it at the credential's token endpoint for a short-lived access
//! token. Tokens are cached until shortly before expiry; the cache is the
//! only mutable state and sits behind an async `RwLock`.

use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{credentials::ServiceAccountKey, firestore::client::FirestoreError};

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the reported expiry to avoid using a token that
/// dies mid-request.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub(crate) struct AccessTokens {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl AccessTokens {
    /// Build a provider from the service-account key. Fails when the
    /// private key PEM cannot be parsed.
    pub(crate) fn new(
        key: ServiceAccountKey,
        http: reqwest::Client,
    ) -> Result<Self, FirestoreError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

        Ok(Self {
            key,
            encoding_key,
            http,
            cached: RwLock::new(None),
        })
    }

    /// Return a valid access token, refreshing it when missing or close to
    /// expiry.
    pub(crate) async fn bearer(&self) -> Result<String, FirestoreError> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let mut cached = self.cached.write().await;

        // Another request may have refreshed while we waited for the lock.
        if let Some(current) = cached.as_ref() {
            if current.expires_at > Instant::now() {
                return Ok(current.token.clone());
            }
        }

        let response = self.exchange().await?;
        let token = response.access_token.clone();

        *cached = Some(CachedToken {
            token: response.access_token,
            expires_at: Instant::now()
                + Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_LEEWAY),
        });

        debug!("refreshed document store access token");

        Ok(token)
    }

    async fn exchange(&self) -> Result<TokenResponse, FirestoreError> {
        let issued_at = jiff::Timestamp::now().as_second();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.key.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.private_key_id.clone());

        let assertion = encode(&header, &claims, &self.encoding_key)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(FirestoreError::UnexpectedResponse(format!(
                "token exchange failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}
