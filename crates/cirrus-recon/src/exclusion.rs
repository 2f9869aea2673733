//! Per-collection backup exclusion policy.
//!
//! Collections may configure file-extension suffixes that are intentionally
//! never archived to ORCA. A file matching one of its collection's suffixes
//! is *correct* when absent from the backup catalog and a conflict when
//! present.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cirrus_core::{construct_collection_id, CirrusResult, PageSource, SortedRecordQueue};

/// One collection's exclusion configuration, as yielded by the collection
/// metadata cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfigRecord {
    pub name: String,
    pub version: String,
    /// Configured suffixes, absent when the collection excludes nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_file_extensions: Option<Vec<String>>,
}

/// Resolved exclusion policy, keyed by collection id.
#[derive(Debug, Clone, Default)]
pub struct ExclusionPolicy {
    excluded: HashMap<String, Vec<String>>,
}

impl ExclusionPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register suffixes for a collection.
    pub fn insert(&mut self, collection_id: impl Into<String>, suffixes: Vec<String>) {
        self.excluded.insert(collection_id.into(), suffixes);
    }

    /// True iff `file_name` ends with any suffix configured for the
    /// collection. Exact, case-sensitive suffix match; collections with no
    /// configuration exclude nothing.
    #[must_use]
    pub fn is_excluded(&self, collection_id: &str, file_name: &str) -> bool {
        self.excluded
            .get(collection_id)
            .is_some_and(|suffixes| suffixes.iter().any(|s| file_name.ends_with(s.as_str())))
    }

    /// Number of collections with configured exclusions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Drain the collection configuration cursor once and build the policy.
    ///
    /// Only collections that configure extensions are inserted; everything
    /// else falls through to "excludes nothing".
    pub async fn load<S>(queue: &mut SortedRecordQueue<S>) -> CirrusResult<Self>
    where
        S: PageSource<Item = CollectionConfigRecord> + Send,
    {
        let mut policy = Self::new();
        while let Some(collection) = queue.shift().await? {
            if let Some(suffixes) = collection.excluded_file_extensions {
                let collection_id = construct_collection_id(&collection.name, &collection.version);
                policy.insert(collection_id, suffixes);
            }
        }
        debug!(collections = policy.len(), "loaded backup exclusion policy");
        Ok(policy)
    }
}
