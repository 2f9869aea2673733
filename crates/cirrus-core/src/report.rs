//! Discrepancy reports and the persisted reconciliation report.
//!
//! Wire format matches the operator dashboards: camelCase field names, the
//! conflict reason strings `shouldBeExcludedFromOrca` / `onlyInCumulus` /
//! `onlyInOrca`, and the terminal statuses `SUCCESS` / `Failed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a file is reported as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictReason {
    /// Present in both holdings but configured for exclusion from backup.
    ShouldBeExcludedFromOrca,
    /// Present in Cumulus, absent from the backup catalog, not excluded.
    OnlyInCumulus,
    /// Present in the backup catalog, absent from Cumulus.
    OnlyInOrca,
}

/// A file-level discrepancy between the two holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictFile {
    pub file_name: String,
    pub bucket: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orca_bucket: Option<String>,
    pub reason: ConflictReason,
}

/// Per-granule discrepancy report.
///
/// Invariant: `ok_files_count + conflict_files.len()` equals the number of
/// distinct file names across both holdings, and `ok` is true exactly when
/// every name was classified ok.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GranuleReport {
    /// Not persisted in the aggregate lists; used for classification only.
    #[serde(default, skip_serializing)]
    pub ok: bool,
    pub ok_files_count: u64,
    pub cumulus_files_count: u64,
    pub orca_files_count: u64,
    pub granule_id: String,
    pub collection_id: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub conflict_files: Vec<ConflictFile>,
}

/// Aggregate granule-holdings report built by the merge-join driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GranulesReport {
    pub ok_count: u64,
    pub cumulus_count: u64,
    pub orca_count: u64,
    pub ok_files_count: u64,
    pub cumulus_files_count: u64,
    pub orca_files_count: u64,
    pub conflict_files_count: u64,
    pub with_conflicts: Vec<GranuleReport>,
    pub only_in_cumulus: Vec<GranuleReport>,
    pub only_in_orca: Vec<GranuleReport>,
}

impl GranulesReport {
    /// Fold one granule pulled from the Cumulus queue into the aggregate.
    ///
    /// `matched_orca` is whether the granule had a backup-catalog
    /// counterpart; it decides which conflict list a not-ok granule lands in.
    pub fn fold(&mut self, granule: GranuleReport, matched_orca: bool) {
        self.conflict_files_count += granule.conflict_files.len() as u64;
        self.ok_files_count += granule.ok_files_count;
        self.cumulus_files_count += granule.cumulus_files_count;
        self.orca_files_count += granule.orca_files_count;

        if granule.ok {
            self.ok_count += 1;
        } else if matched_orca {
            self.with_conflicts.push(granule);
        } else {
            self.only_in_cumulus.push(granule);
        }
    }

    /// Fold one granule that exists only in the backup catalog.
    pub fn add_orca_only(&mut self, granule: GranuleReport) {
        self.conflict_files_count += granule.conflict_files.len() as u64;
        self.orca_files_count += granule.orca_files_count;
        self.only_in_orca.push(granule);
    }
}

/// Lifecycle status of a persisted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    #[serde(rename = "SUCCESS")]
    Success,
    Failed,
}

/// The persisted reconciliation report: header parameters plus the granule
/// holdings comparison.
///
/// Written once in `Pending` status before the driver runs and overwritten
/// with a terminal status when the run completes or fails. No further
/// mutation after the terminal write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub status: ReportStatus,
    pub report_type: String,
    pub create_start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granule_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    /// Beginning of the `created_at` window the report covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_start_time: Option<DateTime<Utc>>,
    /// End of the `created_at` window the report covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_end_time: Option<DateTime<Utc>>,
    pub granules: GranulesReport,
}
