//! Fan-out dependency queries across all configured repositories and merge
//! the answers by priority.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use log::{debug, warn};

use crate::directory::Directory;
use crate::error::Result;
use crate::gem::{PackageRecord, Repository};
use crate::upstream::DependencySource;

/// Queries every repository concurrently and merges the results.
///
/// Repositories are held in priority order: index 0 wins any identity
/// conflict. The merged view is written through to the shared [`Directory`]
/// so later download requests can be redirected to the right upstream.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn DependencySource>,
    repositories: Arc<[Repository]>,
    directory: Arc<Directory>,
}

impl Aggregator {
    pub fn new(
        source: Arc<dyn DependencySource>,
        repositories: Vec<Repository>,
        directory: Arc<Directory>,
    ) -> Self {
        Self {
            source,
            repositories: repositories.into(),
            directory,
        }
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Dependency records for `names` across all repositories.
    ///
    /// Every upstream request runs to completion before anything is merged.
    /// If any of them failed, the error of the highest-priority failing
    /// repository is returned and the directory is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn query(&self, names: &[String]) -> Result<Vec<PackageRecord>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Querying {} repositories for {} gems",
            self.repositories.len(),
            names.len()
        );

        // join_all yields results in input order, so slot i always belongs
        // to repository i no matter which request finishes first.
        let slots = join_all(
            self.repositories
                .iter()
                .map(|repository| self.source.fetch_dependencies(names, repository)),
        )
        .await;

        let mut per_repository = Vec::with_capacity(slots.len());
        let mut first_error = None;
        for (repository, slot) in self.repositories.iter().zip(slots) {
            match slot {
                Ok(records) => per_repository.push(records),
                Err(e) => {
                    warn!("Dependency query against {} failed: {}", repository, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let merged = merge(per_repository);
        self.directory.update(&merged);
        Ok(merged)
    }
}

/// Flattens per-repository results in priority order, keeping the first
/// record seen for each identity.
///
/// Records are keyed on the canonical identity string, the same key the
/// [`Directory`] uses, so every merged record owns its directory entry.
pub fn merge(per_repository: Vec<Vec<PackageRecord>>) -> Vec<PackageRecord> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for records in per_repository {
        for record in records {
            if seen.insert(record.identity().to_string()) {
                merged.push(record);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gem::Dependency;
    use crate::upstream::MockDependencySource;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::collections::HashMap;
    use std::time::Duration;

    fn repo(url: &str) -> Repository {
        url.parse().unwrap()
    }

    fn record(name: &str, version: &str, repository: &Repository) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: version.to_string(),
            platform: "ruby".to_string(),
            dependencies: vec![],
            repository: repository.clone(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn status_error(repository: &Repository) -> GatewayError {
        GatewayError::Status {
            url: repository.dependencies_url().to_string(),
            reason: "HTTP 503: repository server error".to_string(),
        }
    }

    /// Serves canned records per repository, optionally after a delay.
    struct StubSource {
        responses: HashMap<Repository, (Duration, Vec<PackageRecord>)>,
    }

    #[async_trait]
    impl DependencySource for StubSource {
        async fn fetch_dependencies(
            &self,
            _names: &[String],
            repository: &Repository,
        ) -> Result<Vec<PackageRecord>> {
            let (delay, records) = self.responses.get(repository).cloned().unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(records)
        }
    }

    #[test]
    fn test_merge_prefers_higher_priority() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");

        let merged = merge(vec![
            vec![record("rack", "2.2.8", &a), record("rails", "7.1.0", &a)],
            vec![record("rack", "2.2.8", &b), record("rack", "3.0.0", &b)],
        ]);

        let ids: Vec<_> = merged.iter().map(|r| r.identity().to_string()).collect();
        assert_eq!(ids, vec!["rack-2.2.8", "rails-7.1.0", "rack-3.0.0"]);
        assert_eq!(merged[0].repository, a);
        assert_eq!(merged[2].repository, b);
    }

    #[test]
    fn test_merge_platform_is_part_of_identity() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");
        let mut native = record("nokogiri", "1.16.0", &b);
        native.platform = "x86_64-linux".to_string();

        let merged = merge(vec![vec![record("nokogiri", "1.16.0", &a)], vec![native]]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].repository, b);
    }

    #[test]
    fn test_merge_keeps_first_copy_contents() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");
        let mut from_a = record("rails", "7.1.0", &a);
        from_a.dependencies = vec![Dependency::new("rack", ">= 2.2.4")];

        let merged = merge(vec![vec![from_a.clone()], vec![record("rails", "7.1.0", &b)]]);

        assert_eq!(merged, vec![from_a]);
    }

    #[tokio::test]
    async fn test_query_dedups_on_canonical_file_name() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");

        // Both spell the gem file "a-1-java.gem".
        let mut source = MockDependencySource::new();
        source
            .expect_fetch_dependencies()
            .with(mockall::predicate::always(), eq(a.clone()))
            .returning(|_, repository| Ok(vec![record("a", "1-java", repository)]));
        source
            .expect_fetch_dependencies()
            .with(mockall::predicate::always(), eq(b.clone()))
            .returning(|_, repository| {
                let mut native = record("a", "1", repository);
                native.platform = "java".to_string();
                Ok(vec![native])
            });

        let directory = Arc::new(Directory::new());
        let aggregator = Aggregator::new(
            Arc::new(source),
            vec![a.clone(), b],
            Arc::clone(&directory),
        );

        let merged = aggregator.query(&names(&["a"])).await.unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].version, "1-java");
        assert_eq!(directory.lookup("a-1-java"), Some(a));
    }

    #[tokio::test]
    async fn test_query_merges_and_updates_directory() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");

        let mut source = MockDependencySource::new();
        let (ra, rb) = (a.clone(), b.clone());
        source
            .expect_fetch_dependencies()
            .with(eq(names(&["rack", "rails"])), eq(a.clone()))
            .times(1)
            .returning(move |_, _| Ok(vec![record("rack", "2.2.8", &ra)]));
        source
            .expect_fetch_dependencies()
            .with(eq(names(&["rack", "rails"])), eq(b.clone()))
            .times(1)
            .returning(move |_, _| {
                Ok(vec![record("rack", "2.2.8", &rb), record("rails", "7.1.0", &rb)])
            });

        let directory = Arc::new(Directory::new());
        let aggregator = Aggregator::new(
            Arc::new(source),
            vec![a.clone(), b.clone()],
            Arc::clone(&directory),
        );

        let merged = aggregator.query(&names(&["rack", "rails"])).await.unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(directory.lookup("rack-2.2.8"), Some(a));
        assert_eq!(directory.lookup("rails-7.1.0"), Some(b));
        assert!(directory.lookup("rack-3.0.0").is_none());
        assert_eq!(directory.len(), 2);
    }

    #[tokio::test]
    async fn test_query_empty_names_skips_upstreams() {
        let mut source = MockDependencySource::new();
        source.expect_fetch_dependencies().times(0);

        let directory = Arc::new(Directory::new());
        let aggregator = Aggregator::new(
            Arc::new(source),
            vec![repo("https://a.example.com")],
            Arc::clone(&directory),
        );

        let merged = aggregator.query(&[]).await.unwrap();

        assert!(merged.is_empty());
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn test_query_fails_if_any_repository_fails() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");

        let mut source = MockDependencySource::new();
        let ra = a.clone();
        source
            .expect_fetch_dependencies()
            .with(mockall::predicate::always(), eq(a.clone()))
            .times(1)
            .returning(move |_, _| Ok(vec![record("rack", "2.2.8", &ra)]));
        source
            .expect_fetch_dependencies()
            .with(mockall::predicate::always(), eq(b.clone()))
            .times(1)
            .returning(|_, repository| Err(status_error(repository)));

        let directory = Arc::new(Directory::new());
        let aggregator = Aggregator::new(Arc::new(source), vec![a, b], Arc::clone(&directory));

        let err = aggregator.query(&names(&["rack"])).await.unwrap_err();

        assert!(err.is_transport());
        assert!(err.to_string().contains("b.example.com"));
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn test_query_reports_highest_priority_failure() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");

        let mut source = MockDependencySource::new();
        source
            .expect_fetch_dependencies()
            .times(2)
            .returning(|_, repository| Err(status_error(repository)));

        let aggregator = Aggregator::new(
            Arc::new(source),
            vec![a, b],
            Arc::new(Directory::new()),
        );

        let err = aggregator.query(&names(&["rack"])).await.unwrap_err();
        assert!(err.to_string().contains("a.example.com"));
    }

    #[tokio::test]
    async fn test_query_order_independent_of_completion() {
        let a = repo("https://a.example.com");
        let b = repo("https://b.example.com");
        let a_records = vec![record("rack", "2.2.8", &a), record("rails", "7.1.0", &a)];
        let b_records = vec![record("rails", "7.1.0", &b), record("puma", "6.4.0", &b)];

        let run = |delay_a: Duration| {
            let source = StubSource {
                responses: HashMap::from([
                    (a.clone(), (delay_a, a_records.clone())),
                    (b.clone(), (Duration::ZERO, b_records.clone())),
                ]),
            };
            Aggregator::new(
                Arc::new(source),
                vec![a.clone(), b.clone()],
                Arc::new(Directory::new()),
            )
        };

        let gems = names(&["rack", "rails", "puma"]);
        let undelayed = run(Duration::ZERO).query(&gems).await.unwrap();
        let delayed = run(Duration::from_millis(50)).query(&gems).await.unwrap();

        assert_eq!(undelayed, delayed);
        let ids: Vec<_> = delayed.iter().map(|r| r.identity().to_string()).collect();
        assert_eq!(ids, vec!["rack-2.2.8", "rails-7.1.0", "puma-6.4.0"]);
        assert_eq!(delayed[1].repository, a);
    }

    #[tokio::test]
    async fn test_query_runs_repositories_concurrently() {
        let repos: Vec<_> = (0..4)
            .map(|i| repo(&format!("https://r{}.example.com", i)))
            .collect();
        let source = StubSource {
            responses: repos
                .iter()
                .map(|r| (r.clone(), (Duration::from_millis(200), vec![])))
                .collect(),
        };
        let aggregator = Aggregator::new(Arc::new(source), repos, Arc::new(Directory::new()));

        let started = std::time::Instant::now();
        aggregator.query(&names(&["rack"])).await.unwrap();

        // Sequential requests would take at least 800ms.
        assert!(started.elapsed() < Duration::from_millis(700));
    }
}
