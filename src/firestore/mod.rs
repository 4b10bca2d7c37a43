//! Firestore REST adapter.
//!
//! A thin client over the `https://firestore.googleapis.com/v1` document
//! API: exhaustive collection listing, single-document reads, equality
//! queries, and atomic write batches. Authentication uses the OAuth2
//! service-account `jwt-bearer` flow with a cached access token.

mod client;
mod oauth;
pub(crate) mod value;

pub(crate) use client::*;
