//! JSON codec for the dependency API.
//!
//! Upstream repositories and gateway clients share one schema:
//!
//! ```json
//! [{"name": "rack", "number": "2.2.8", "platform": "ruby",
//!   "dependencies": [["webrick", ">= 0"]]}]
//! ```
//!
//! Decoding is strict about shape. A missing `platform` means
//! [`DEFAULT_PLATFORM`] and a missing `dependencies` means none; anything
//! else that does not fit is a decode error.

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::gem::{DEFAULT_PLATFORM, Dependency, PackageRecord, Repository};

/// Wire form of one record.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireRecord {
    name: String,
    number: String,
    #[serde(default = "default_platform")]
    platform: String,
    #[serde(default)]
    dependencies: Vec<(String, String)>,
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

impl WireRecord {
    fn into_record(self, repository: &Repository) -> PackageRecord {
        PackageRecord {
            name: self.name,
            version: self.number,
            platform: self.platform,
            dependencies: self
                .dependencies
                .into_iter()
                .map(|(name, requirement)| Dependency { name, requirement })
                .collect(),
            repository: repository.clone(),
        }
    }
}

impl From<&PackageRecord> for WireRecord {
    fn from(record: &PackageRecord) -> Self {
        Self {
            name: record.name.clone(),
            number: record.version.clone(),
            platform: record.platform.clone(),
            dependencies: record
                .dependencies
                .iter()
                .map(|dep| (dep.name.clone(), dep.requirement.clone()))
                .collect(),
        }
    }
}

/// Decodes an upstream response body into records tagged with `repository`.
pub fn decode_records(body: &[u8], repository: &Repository) -> Result<Vec<PackageRecord>> {
    let wire: Vec<WireRecord> =
        serde_json::from_slice(body).map_err(|source| GatewayError::Decode {
            repo: repository.to_string(),
            source,
        })?;

    Ok(wire
        .into_iter()
        .map(|record| record.into_record(repository))
        .collect())
}

/// Encodes records for a gateway client. The source repository is not part
/// of the wire format.
pub fn encode_records(records: &[PackageRecord]) -> serde_json::Result<Vec<u8>> {
    let wire: Vec<WireRecord> = records.iter().map(WireRecord::from).collect();
    serde_json::to_vec(&wire)
}
