//! Per-endpoint failure mapping.
//!
//! Every dependency failure becomes a 500 whose body carries the endpoint's
//! own message prefix plus the underlying error text.

use std::fmt::Display;

use tracing::error;

use crate::errors::ApiError;

fn dependency(context: &str, error: impl Display) -> ApiError {
    error!("{context}: {error}");

    ApiError::Dependency(format!("{context}: {error}"))
}

pub(crate) fn retrieving_products(error: impl Display) -> ApiError {
    dependency("error retrieving products", error)
}

pub(crate) fn retrieving_offers(error: impl Display) -> ApiError {
    dependency("error retrieving offers", error)
}

pub(crate) fn generating_suggestions(error: impl Display) -> ApiError {
    dependency("error generating suggestions", error)
}

pub(crate) fn creating_offers(error: impl Display) -> ApiError {
    dependency("error creating offers", error)
}

pub(crate) fn removing_offer(error: impl Display) -> ApiError {
    dependency("error removing offer", error)
}
