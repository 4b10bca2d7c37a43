//! Auth errors.

use thiserror::Error;

/// Reasons an ID token fails verification. The display text ends up in the
/// `details` field of the 401 body.
#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("unknown signing key: {0}")]
    UnknownKeyId(String),

    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),

    #[error("identity verifier not initialized")]
    NotInitialized,
}
