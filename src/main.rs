//! Shopfront Offers JSON API Server

use std::process;

use salvo::{
    affix_state::inject,
    cors::{AllowOrigin, Cors},
    http::{Method, header},
    prelude::*,
    serve_static::StaticDir,
    trailing_slash::remove_slash,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{config::ServerConfig, state::State};

mod auth;
mod config;
mod credentials;
mod errors;
mod extensions;
mod firestore;
mod orders;
mod products;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Shopfront Offers JSON API Server entry point
///
/// # Panics
///
/// Panics if the server fails to bind or serve requests
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    // Credential failures are non-fatal: the server answers with 500/401
    // shapes until the credentials are fixed.
    let state = State::initialize(&config);

    // CORS sits on the service so preflight requests are answered before
    // routing, mirroring the permissive policy of the original frontend.
    let cors = Cors::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .into_handler();

    let service = Service::new(app_router(&config, state)).hoop(cors);

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(service).await;
}

pub(crate) fn app_router(config: &ServerConfig, state: std::sync::Arc<State>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(
            Router::with_path("api")
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("get_all_products")
                        .get(products::handlers::index::handler),
                )
                .push(Router::with_path("get_offers").get(products::handlers::offers::handler))
                .push(
                    Router::with_path("offer_suggestions")
                        .get(products::handlers::suggestions::handler),
                )
                .push(
                    Router::with_path("create_offers")
                        .post(products::handlers::create_offers::handler),
                )
                .push(
                    Router::with_path("remove_offer")
                        .post(products::handlers::remove_offer::handler),
                ),
        )
        .push(
            Router::with_path("{**path}").get(
                StaticDir::new([config.templates_dir.clone()]).defaults("index.html"),
            ),
        )
}
