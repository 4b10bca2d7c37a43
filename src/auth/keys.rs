//! Signing-key cache.
//!
//! The identity provider publishes its RSA signing keys as a JWKS document.
//! Keys are cached by `kid`; the cache refreshes when it goes stale or when
//! a token arrives signed with a key it has not seen.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::errors::AuthError;

const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// One key as published in the JWKS document. Only RSA components are
/// captured; that is all the provider issues.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

struct CacheInner {
    keys: HashMap<String, Jwk>,
    fetched_at: Option<Instant>,
}

pub(crate) struct KeyCache {
    http: reqwest::Client,
    url: String,
    inner: RwLock<CacheInner>,
}

impl KeyCache {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            inner: RwLock::new(CacheInner {
                keys: HashMap::new(),
                fetched_at: None,
            }),
        }
    }

    /// The decoding key for `kid`, refreshing the cache when the key is
    /// unknown or the cache is stale.
    pub(crate) async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.inner.read().await;

            if let (Some(jwk), Some(fetched_at)) = (cache.keys.get(kid), cache.fetched_at) {
                if fetched_at.elapsed() < REFRESH_INTERVAL {
                    return decoding_key_from(jwk);
                }
            }
        }

        let mut cache = self.inner.write().await;

        // Whoever got the write lock first may already have refreshed.
        if cache.fetched_at.is_none_or(|at| at.elapsed() >= REFRESH_INTERVAL)
            || !cache.keys.contains_key(kid)
        {
            cache.keys = self.fetch().await?;
            cache.fetched_at = Some(Instant::now());

            debug!("refreshed {} identity signing keys", cache.keys.len());
        }

        cache
            .keys
            .get(kid)
            .ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))
            .and_then(decoding_key_from)
    }

    async fn fetch(&self) -> Result<HashMap<String, Jwk>, AuthError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|error| AuthError::KeyFetch(error.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!(
                "status {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|error| AuthError::KeyFetch(error.to_string()))?;

        Ok(jwks
            .keys
            .into_iter()
            .filter_map(|key| key.kid.clone().map(|kid| (kid, key)))
            .collect())
    }
}

fn decoding_key_from(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        return Err(AuthError::Invalid(format!(
            "unsupported key type: {}",
            jwk.kty
        )));
    }

    match (&jwk.n, &jwk.e) {
        (Some(n), Some(e)) => DecodingKey::from_rsa_components(n, e)
            .map_err(|error| AuthError::Invalid(error.to_string())),
        _ => Err(AuthError::Invalid("RSA key missing components".to_string())),
    }
}
