//! Durable report storage.
//!
//! Reports are persisted as whole-object JSON writes; each write is a full
//! overwrite with no read-modify-write. The trait keeps the lifecycle
//! testable against an in-memory store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use cirrus_core::{CirrusError, CirrusResult, ReconciliationReport};

/// Durable object store for reconciliation reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Write the report to `bucket/key`, overwriting any previous object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        report: &ReconciliationReport,
    ) -> CirrusResult<()>;
}

/// S3-backed report store.
#[derive(Debug, Clone)]
pub struct S3ReportStore {
    client: aws_sdk_s3::Client,
}

impl S3ReportStore {
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a store from the default AWS credential/region chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_s3::Client::new(&config))
    }
}

#[async_trait]
impl ReportStore for S3ReportStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        report: &ReconciliationReport,
    ) -> CirrusResult<()> {
        let body = serde_json::to_vec_pretty(report)?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| CirrusError::Storage(e.to_string()))?;
        debug!(bucket, key, "wrote reconciliation report");
        Ok(())
    }
}

/// In-memory report store recording every write.
///
/// Objects are stored as the serialized JSON string so tests observe the
/// same bytes an S3 write would produce, including the Pending-then-final
/// overwrite sequence.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    puts: Mutex<Vec<(String, String, String)>>,
}

impl MemoryReportStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest object body at `bucket/key`, if any.
    #[must_use]
    pub fn get(&self, bucket: &str, key: &str) -> Option<String> {
        self.puts.lock().ok().and_then(|puts| {
            puts.iter()
                .rev()
                .find(|(b, k, _)| b == bucket && k == key)
                .map(|(_, _, body)| body.clone())
        })
    }

    /// Every write in order, as `(bucket, key, body)`.
    #[must_use]
    pub fn history(&self) -> Vec<(String, String, String)> {
        self.puts.lock().map(|puts| puts.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        report: &ReconciliationReport,
    ) -> CirrusResult<()> {
        let body = serde_json::to_string_pretty(report)?;
        self.puts
            .lock()
            .map_err(|_| CirrusError::Storage("report store lock poisoned".to_string()))?
            .push((bucket.to_string(), key.to_string(), body));
        Ok(())
    }
}

/// Map of `(bucket, key)` to parsed reports, for callers that want the last
/// write per object rather than the full history.
#[must_use]
pub fn latest_reports(
    history: &[(String, String, String)],
) -> HashMap<(String, String), ReconciliationReport> {
    let mut latest = HashMap::new();
    for (bucket, key, body) in history {
        if let Ok(report) = serde_json::from_str::<ReconciliationReport>(body) {
            latest.insert((bucket.clone(), key.clone()), report);
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ReconciliationParams;

    #[tokio::test]
    async fn test_memory_store_records_overwrites_in_order() {
        let store = MemoryReportStore::new();
        let params = ReconciliationParams::new("ORCA Backup", "bucket", "report.json");

        let pending = params.initial_report_header();
        store.put("bucket", "report.json", &pending).await.unwrap();

        let mut done = pending.clone();
        done.status = cirrus_core::ReportStatus::Success;
        store.put("bucket", "report.json", &done).await.unwrap();

        let history = store.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].2.contains("\"Pending\""));
        assert!(history[1].2.contains("\"SUCCESS\""));

        let latest = store.get("bucket", "report.json").unwrap();
        assert!(latest.contains("\"SUCCESS\""));

        let parsed = latest_reports(&history);
        assert_eq!(
            parsed[&("bucket".to_string(), "report.json".to_string())].status,
            cirrus_core::ReportStatus::Success
        );
    }

    #[tokio::test]
    async fn test_memory_store_get_missing_object() {
        let store = MemoryReportStore::new();
        assert!(store.get("bucket", "missing.json").is_none());
    }
}
