//! HTTP client used to talk to upstream repositories.

mod client;
mod status;

pub use client::{HttpClient, build_http_client};
