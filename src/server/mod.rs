//! HTTP front end: the virtual repository clients talk to.

mod handlers;
mod middleware;

use std::future::Future;

use anyhow::{Context, Result};
use axum::{Router, middleware::from_fn, routing::get};
use log::info;
use tokio::net::TcpListener;

use crate::aggregate::Aggregator;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
}

pub fn router(aggregator: Aggregator) -> Router {
    Router::new()
        .route("/api/v1/dependencies", get(handlers::dependencies))
        .route("/gems/:file", get(handlers::gem))
        .with_state(AppState { aggregator })
        .layer(from_fn(middleware::log_request))
}

/// Serves the gateway on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, aggregator: Aggregator, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("Failed to get local address of listener")?;

    for (priority, repository) in aggregator.repositories().iter().enumerate() {
        info!("Upstream #{}: {}", priority, repository);
    }
    info!("Listening on {}", addr);

    axum::serve(listener, router(aggregator))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Gateway server failed")
}
