//! Granule and file records for both holdings.
//!
//! A granule is tracked independently by the primary store (Cumulus) and the
//! backup catalog (ORCA). Both record shapes carry the composite ordering key
//! used by the merge-join driver.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator used in composite collection ids (`name___version`).
const COLLECTION_ID_SEPARATOR: &str = "___";

/// Compose a collection id from a collection name and version.
#[must_use]
pub fn construct_collection_id(name: &str, version: &str) -> String {
    format!("{name}{COLLECTION_ID_SEPARATOR}{version}")
}

/// Split a collection id back into `(name, version)`.
///
/// Returns `None` if the id does not contain the separator.
#[must_use]
pub fn deconstruct_collection_id(collection_id: &str) -> Option<(&str, &str)> {
    collection_id.split_once(COLLECTION_ID_SEPARATOR)
}

/// Composite ordering key `(granule_id, collection_id)`.
///
/// Both input queues are sorted ascending by the lexicographic concatenation
/// `granule_id + ":" + collection_id`; comparison here must match that order
/// exactly. Keys are unique per queue; duplicates are undefined behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranuleKey {
    pub granule_id: String,
    pub collection_id: String,
}

impl GranuleKey {
    #[must_use]
    pub fn new(granule_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            granule_id: granule_id.into(),
            collection_id: collection_id.into(),
        }
    }

}

impl Ord for GranuleKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self
            .granule_id
            .bytes()
            .chain([b':'])
            .chain(self.collection_id.bytes());
        let rhs = other
            .granule_id
            .bytes()
            .chain([b':'])
            .chain(other.collection_id.bytes());
        lhs.cmp(rhs)
    }
}

impl PartialOrd for GranuleKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GranuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.granule_id, self.collection_id)
    }
}

/// A file as known to Cumulus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulusFile {
    pub bucket: String,
    pub key: String,
}

impl CumulusFile {
    /// Logical file name: the base name of `key`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        base_name(&self.key)
    }
}

/// A granule as known to Cumulus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulusGranuleRecord {
    pub granule_id: String,
    /// Composite `name___version` id.
    pub collection_id: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<CumulusFile>,
}

impl CumulusGranuleRecord {
    /// Ordering key for the merge-join.
    #[must_use]
    pub fn key(&self) -> GranuleKey {
        GranuleKey::new(self.granule_id.clone(), self.collection_id.clone())
    }
}

/// A file as known to the ORCA backup catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrcaFile {
    pub name: String,
    pub cumulus_archive_location: String,
    pub orca_archive_location: String,
    pub key_path: String,
}

impl OrcaFile {
    /// Logical file name: the base name of `key_path`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        base_name(&self.key_path)
    }
}

/// A granule as known to the ORCA backup catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrcaGranuleRecord {
    /// Granule id (named `id` on the catalog wire format).
    pub id: String,
    pub collection_id: String,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<OrcaFile>,
}

impl OrcaGranuleRecord {
    /// Ordering key for the merge-join.
    #[must_use]
    pub fn key(&self) -> GranuleKey {
        GranuleKey::new(self.id.clone(), self.collection_id.clone())
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
