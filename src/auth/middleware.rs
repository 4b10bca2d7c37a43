//! Auth middleware.
//!
//! Runs ahead of every `/api` route: extract the bearer token, hand it to
//! the verifier, short-circuit with a 401 JSON body on any failure. No
//! role or permission check follows; a valid token opens every endpoint.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::{debug, warn};

use crate::{auth::errors::AuthError, errors::ApiError, extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        ApiError::MissingToken.render_to(res);

        return;
    };

    let state = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => state,
        Err(error) => {
            error.render_to(res);

            return;
        }
    };

    let Some(verifier) = state.verifier() else {
        warn!("rejecting request: {}", AuthError::NotInitialized);

        ApiError::invalid_token(AuthError::NotInitialized.to_string()).render_to(res);

        return;
    };

    match verifier.verify_id_token(token).await {
        Ok(claims) => {
            debug!(sub = %claims.sub, "authenticated request");

            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => {
            warn!("token verification failed: {error}");

            ApiError::invalid_token(error.to_string()).render_to(res);
        }
    }
}

/// Pull the token out of the Authorization header: split on whitespace and
/// take the last piece, so both `Bearer <token>` and a bare token work.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;

    value.split_whitespace().last()
}
