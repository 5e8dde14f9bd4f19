//! Dependency API client for RubyGems-compatible repositories.

use async_trait::async_trait;
use log::debug;

use super::DependencySource;
use crate::codec::decode_records;
use crate::error::Result;
use crate::gem::{PackageRecord, Repository};
use crate::http::HttpClient;

/// Production [`DependencySource`] that speaks
/// `GET <base>/api/v1/dependencies?gems=a,b,c`.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: HttpClient,
}

impl UpstreamClient {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl DependencySource for UpstreamClient {
    #[tracing::instrument(skip(self, names), fields(count = names.len()))]
    async fn fetch_dependencies(
        &self,
        names: &[String],
        repository: &Repository,
    ) -> Result<Vec<PackageRecord>> {
        let gems = names.join(",");

        let body = self
            .http_client
            .get_bytes_with_query(repository.dependencies_url(), &[("gems", &gems)])
            .await?;
        let records = decode_records(&body, repository)?;

        debug!(
            "{} returned {} records for {} gems",
            repository,
            records.len(),
            names.len()
        );
        Ok(records)
    }
}
