//! Process-wide directory of which repository holds which gem file.
//!
//! Written after every successful dependency merge and read by the download
//! redirect path. Entries are never removed: a later write for the same
//! identity replaces the earlier repository.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use log::debug;

use crate::gem::{PackageRecord, Repository};

#[derive(Debug, Default)]
pub struct Directory {
    entries: RwLock<HashMap<String, Repository>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points each record's identity at the repository it came from.
    pub fn update(&self, records: &[PackageRecord]) {
        if records.is_empty() {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for record in records {
            entries.insert(record.identity().to_string(), record.repository.clone());
        }
        debug!(
            "Directory updated with {} records ({} known gems)",
            records.len(),
            entries.len()
        );
    }

    /// Repository last recorded for `identity` (canonical `name-version[-platform]`).
    pub fn lookup(&self, identity: &str) -> Option<Repository> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
