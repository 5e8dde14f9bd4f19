//! Request handlers for the two gateway endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use log::{debug, error, info};
use serde::Deserialize;

use super::AppState;
use crate::codec::encode_records;
use crate::error::GatewayError;

const GEM_SUFFIX: &str = ".gem";

#[derive(Debug, Deserialize)]
pub struct DependencyQuery {
    #[serde(default)]
    gems: String,
}

/// Splits the `gems` parameter, dropping blank entries.
pub fn parse_gem_names(gems: &str) -> Vec<String> {
    gems.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// `GET /api/v1/dependencies?gems=a,b,c`
pub async fn dependencies(
    State(state): State<AppState>,
    Query(query): Query<DependencyQuery>,
) -> Response {
    let names = parse_gem_names(&query.gems);
    if names.is_empty() {
        return StatusCode::OK.into_response();
    }

    let records = match state.aggregator.query(&names).await {
        Ok(records) => records,
        Err(e) => {
            error!("Dependency query for {:?} failed: {}", names, e);
            return e.into_response();
        }
    };

    match encode_records(&records) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            error!("Failed to encode {} records: {}", records.len(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// `GET /gems/<identity>.gem`, redirected to the repository that served it.
pub async fn gem(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    if !file.ends_with(GEM_SUFFIX) {
        debug!("Not a gem file: {}", file);
        return GatewayError::NotFound(file).into_response();
    }
    let identity = &file[..file.len() - GEM_SUFFIX.len()];

    let Some(repository) = state.aggregator.directory().lookup(identity) else {
        debug!("No repository known for {}", identity);
        return GatewayError::NotFound(identity.to_string()).into_response();
    };

    match repository.gem_url(identity) {
        Ok(location) => {
            info!("Found {} in repo {}", file, repository);
            (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, location.to_string())],
            )
                .into_response()
        }
        Err(e) => {
            error!("{:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
