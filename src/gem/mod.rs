//! Canonical package records and the repositories they come from.

mod identity;

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use url::Url;

pub use identity::{DEFAULT_PLATFORM, PackageIdentity};

/// Path of the dependency API, relative to a repository base URL.
const DEPENDENCIES_PATH: &str = "api/v1/dependencies";

/// An upstream gem repository, identified by its base URL.
///
/// The base always ends with `/` so relative endpoints resolve beneath it
/// (`https://gems.example.com/mirror` becomes `https://gems.example.com/mirror/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    base: Url,
    dependencies: Url,
}

impl Repository {
    pub fn new(mut base: Url) -> Result<Self> {
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!(
                "Unsupported repository scheme '{}' in {}. Expected http or https.",
                base.scheme(),
                base
            );
        }
        if base.cannot_be_a_base() {
            anyhow::bail!("Repository URL cannot be used as a base: {}", base);
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        let dependencies = base
            .join(DEPENDENCIES_PATH)
            .with_context(|| format!("Failed to build dependencies URL for {}", base))?;

        Ok(Self { base, dependencies })
    }

    /// `<base>/api/v1/dependencies`
    pub fn dependencies_url(&self) -> &Url {
        &self.dependencies
    }

    /// `<base>/gems/<identity>.gem`
    pub fn gem_url(&self, identity: &str) -> Result<Url> {
        self.base
            .join(&format!("gems/{}.gem", identity))
            .with_context(|| format!("Failed to build gem URL for {} on {}", identity, self.base))
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}

impl FromStr for Repository {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s.trim()).with_context(|| format!("Invalid repository URL: {}", s))?;
        Repository::new(url)
    }
}

/// A (name, requirement) edge to another gem. The requirement is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub requirement: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: requirement.into(),
        }
    }
}

/// One gem version as reported by an upstream repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub dependencies: Vec<Dependency>,
    pub repository: Repository,
}

impl PackageRecord {
    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(&self.name, &self.version, &self.platform)
    }
}
