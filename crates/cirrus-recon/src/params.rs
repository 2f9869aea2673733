//! Report request parameters and header construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cirrus_core::{CirrusError, CirrusResult, GranulesReport, ReconciliationReport, ReportStatus};
use cirrus_orca::OrcaSearchParams;

/// Parameters for one reconciliation run.
///
/// The collection/granule/provider filters and the `created_at` window are
/// all optional; an unfiltered run reconciles the full holdings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationParams {
    /// Report type echoed into the header, e.g. `"ORCA Backup"`.
    pub report_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granule_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    /// Beginning of the `created_at` window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// End of the `created_at` window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<DateTime<Utc>>,
    /// Bucket the report object is written to.
    pub system_bucket: String,
    /// Object key of the report.
    pub report_key: String,
    /// When report creation began.
    pub create_start_time: DateTime<Utc>,
}

impl ReconciliationParams {
    /// Minimal parameters for an unfiltered run.
    #[must_use]
    pub fn new(
        report_type: impl Into<String>,
        system_bucket: impl Into<String>,
        report_key: impl Into<String>,
    ) -> Self {
        Self {
            report_type: report_type.into(),
            collection_ids: None,
            granule_ids: None,
            providers: None,
            start_timestamp: None,
            end_timestamp: None,
            system_bucket: system_bucket.into(),
            report_key: report_key.into(),
            create_start_time: Utc::now(),
        }
    }

    /// Validate output location and time window.
    pub fn validate(&self) -> CirrusResult<()> {
        if self.system_bucket.trim().is_empty() {
            return Err(CirrusError::InvalidParams(
                "system_bucket must not be empty".to_string(),
            ));
        }
        if self.report_key.trim().is_empty() {
            return Err(CirrusError::InvalidParams(
                "report_key must not be empty".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_timestamp, self.end_timestamp) {
            if start > end {
                return Err(CirrusError::InvalidParams(format!(
                    "start_timestamp {start} is after end_timestamp {end}"
                )));
            }
        }
        Ok(())
    }

    /// Convert the filters into catalog search parameters (epoch millis).
    #[must_use]
    pub fn to_orca_search_params(&self) -> OrcaSearchParams {
        OrcaSearchParams {
            provider_id: self.providers.clone(),
            collection_id: self.collection_ids.clone(),
            granule_id: self.granule_ids.clone(),
            start_timestamp: self.start_timestamp.map(|t| t.timestamp_millis()),
            end_timestamp: self.end_timestamp.map(|t| t.timestamp_millis()),
        }
    }

    /// Initial report envelope: `Pending` status, request filters echoed,
    /// empty aggregate. Persisted before the driver runs so in-progress runs
    /// are observable at a stable object key.
    #[must_use]
    pub fn initial_report_header(&self) -> ReconciliationReport {
        ReconciliationReport {
            status: ReportStatus::Pending,
            report_type: self.report_type.clone(),
            create_start_time: self.create_start_time,
            create_end_time: None,
            error: None,
            collection_ids: self.collection_ids.clone(),
            granule_ids: self.granule_ids.clone(),
            providers: self.providers.clone(),
            report_start_time: self.start_timestamp,
            report_end_time: self.end_timestamp,
            granules: GranulesReport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_rejects_empty_output_location() {
        let mut params = ReconciliationParams::new("ORCA Backup", "", "report.json");
        assert!(matches!(
            params.validate(),
            Err(CirrusError::InvalidParams(_))
        ));

        params.system_bucket = "system-bucket".to_string();
        params.report_key = " ".to_string();
        assert!(matches!(
            params.validate(),
            Err(CirrusError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut params = ReconciliationParams::new("ORCA Backup", "bucket", "key");
        params.start_timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
        params.end_timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(params.validate().is_err());

        params.end_timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_orca_search_params_use_epoch_millis() {
        let mut params = ReconciliationParams::new("ORCA Backup", "bucket", "key");
        params.providers = Some(vec!["prov1".to_string()]);
        params.end_timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let search = params.to_orca_search_params();
        assert_eq!(search.provider_id, Some(vec!["prov1".to_string()]));
        assert_eq!(search.end_timestamp, Some(1_709_251_200_000));
        assert!(search.start_timestamp.is_none());
    }

    #[test]
    fn test_initial_report_header_is_pending_and_empty() {
        let mut params = ReconciliationParams::new("ORCA Backup", "bucket", "key");
        params.collection_ids = Some(vec!["MOD09GQ___006".to_string()]);

        let report = params.initial_report_header();
        assert_eq!(report.status, ReportStatus::Pending);
        assert!(report.create_end_time.is_none());
        assert!(report.error.is_none());
        assert_eq!(
            report.collection_ids,
            Some(vec!["MOD09GQ___006".to_string()])
        );
        assert_eq!(report.granules.cumulus_count, 0);
        assert!(report.granules.with_conflicts.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "Pending");
        assert!(json.get("createEndTime").is_none());
        assert!(json["granules"].get("okCount").is_some());
    }
}
