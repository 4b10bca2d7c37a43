//! Product and offer handlers, one per endpoint.

pub(crate) mod create_offers;
pub(crate) mod index;
pub(crate) mod offers;
pub(crate) mod remove_offer;
pub(crate) mod suggestions;

use serde::{Deserialize, Serialize};

/// Response body shared by the offer mutation endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MutationResponse {
    pub success: bool,
    pub message: String,
}

impl MutationResponse {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}
