//! Upstream repository access.
//!
//! A [`DependencySource`] answers one dependency query against one
//! repository. The aggregator only sees this trait, so tests can swap in
//! doubles for the network.

mod client;

use async_trait::async_trait;

use crate::error::Result;
use crate::gem::{PackageRecord, Repository};

pub use client::UpstreamClient;

/// Fetches dependency metadata from a single repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependencySource: Send + Sync {
    /// Query `repository` for the dependency records of exactly `names`.
    ///
    /// Every returned record is tagged with `repository`. An upstream that
    /// knows none of the names answers with an empty list, which is not an
    /// error.
    async fn fetch_dependencies(
        &self,
        names: &[String],
        repository: &Repository,
    ) -> Result<Vec<PackageRecord>>;
}
