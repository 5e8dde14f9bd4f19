use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use log::info;

/// Logs every request with its status and latency.
pub async fn log_request(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    info!(
        "{} {} -> {} ({:.1}ms)",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}
