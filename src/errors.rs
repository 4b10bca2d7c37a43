//! API error responses.
//!
//! One mapping layer from error kinds to HTTP status and JSON body; every
//! handler and the auth middleware funnel their failures through here.

use salvo::{Depot, Request, Response, Writer, async_trait, http::StatusCode, prelude::Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    /// No Authorization header on a protected route.
    #[error("no authorization token provided")]
    MissingToken,

    /// Token present but rejected by the identity provider.
    #[error("invalid or expired token")]
    InvalidToken { details: String },

    /// Missing or malformed request body fields.
    #[error("{0}")]
    InvalidRequest(&'static str),

    /// A dependency (document store, identity provider) failed; the
    /// underlying message is embedded in the response body.
    #[error("{0}")]
    Dependency(String),
}

impl ApiError {
    pub(crate) fn invalid_token(details: impl Into<String>) -> Self {
        Self::InvalidToken {
            details: details.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::InvalidToken { details } => {
                json!({ "error": self.to_string(), "details": details })
            }
            _ => json!({ "error": self.to_string() }),
        }
    }

    /// Write this error into `res`. Used directly by the auth middleware,
    /// which renders outside the handler return path.
    pub(crate) fn render_to(self, res: &mut Response) {
        res.status_code(self.status());
        res.render(Json(self.body()));
    }
}

#[async_trait]
impl Writer for ApiError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        self.render_to(res);
    }
}
