//! End-to-end lifecycle tests against in-memory fakes: three
//! `VecPageSource` cursors and a `MemoryReportStore`.

use chrono::{TimeZone, Utc};

use cirrus_core::{
    CirrusError, CumulusFile, CumulusGranuleRecord, OrcaFile, OrcaGranuleRecord, ReportStatus,
    VecPageSource,
};
use cirrus_recon::store::latest_reports;
use cirrus_recon::{
    run_reconciliation, CollectionConfigRecord, MemoryReportStore, ReconciliationParams,
};

fn cumulus_granule(granule_id: &str, collection_id: &str, keys: &[&str]) -> CumulusGranuleRecord {
    CumulusGranuleRecord {
        granule_id: granule_id.to_string(),
        collection_id: collection_id.to_string(),
        provider: "prov1".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
        files: keys
            .iter()
            .map(|key| CumulusFile {
                bucket: "protected".to_string(),
                key: format!("path/{key}"),
            })
            .collect(),
    }
}

fn orca_granule(id: &str, collection_id: &str, names: &[&str]) -> OrcaGranuleRecord {
    OrcaGranuleRecord {
        id: id.to_string(),
        collection_id: collection_id.to_string(),
        provider_id: "prov1".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
        files: names
            .iter()
            .map(|name| OrcaFile {
                name: (*name).to_string(),
                cumulus_archive_location: "protected".to_string(),
                orca_archive_location: "orca-backup".to_string(),
                key_path: format!("path/{name}"),
            })
            .collect(),
    }
}

fn collection_config(
    name: &str,
    version: &str,
    extensions: Option<&[&str]>,
) -> CollectionConfigRecord {
    CollectionConfigRecord {
        name: name.to_string(),
        version: version.to_string(),
        excluded_file_extensions: extensions
            .map(|exts| exts.iter().map(ToString::to_string).collect()),
    }
}

#[tokio::test]
async fn test_successful_run_writes_pending_then_success() {
    let params = ReconciliationParams::new("ORCA Backup", "system-bucket", "reports/run-1.json");
    let store = MemoryReportStore::new();

    // g1 matches cleanly, g2 is missing from backup, g3 exists only in
    // backup, and the MOD09GQ .xml file is intentionally excluded.
    let collections = vec![collection_config("MOD09GQ", "006", Some(&[".xml"]))];
    let cumulus = vec![
        cumulus_granule("g1", "MOD09GQ___006", &["g1.hdf", "g1.cmr.xml"]),
        cumulus_granule("g2", "MOD09GQ___006", &["g2.hdf"]),
    ];
    let orca = vec![
        orca_granule("g1", "MOD09GQ___006", &["g1.hdf"]),
        orca_granule("g3", "MOD09GQ___006", &["g3.hdf"]),
    ];

    run_reconciliation(
        &params,
        VecPageSource::new(collections, 10),
        VecPageSource::new(cumulus, 1),
        VecPageSource::new(orca, 1),
        &store,
    )
    .await
    .unwrap();

    let history = store.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].0, "system-bucket");
    assert_eq!(history[0].1, "reports/run-1.json");

    let pending: serde_json::Value = serde_json::from_str(&history[0].2).unwrap();
    assert_eq!(pending["status"], "Pending");
    assert_eq!(pending["reportType"], "ORCA Backup");
    assert!(pending.get("createEndTime").is_none());
    assert_eq!(pending["granules"]["okCount"], 0);

    let done: serde_json::Value = serde_json::from_str(&history[1].2).unwrap();
    assert_eq!(done["status"], "SUCCESS");
    assert!(done.get("createEndTime").is_some());
    assert!(done.get("error").is_none());

    let granules = &done["granules"];
    assert_eq!(granules["okCount"], 1);
    assert_eq!(granules["cumulusCount"], 2);
    assert_eq!(granules["orcaCount"], 2);
    assert_eq!(granules["onlyInCumulus"].as_array().unwrap().len(), 1);
    assert_eq!(granules["onlyInCumulus"][0]["granuleId"], "g2");
    assert_eq!(granules["onlyInOrca"].as_array().unwrap().len(), 1);
    assert_eq!(granules["onlyInOrca"][0]["granuleId"], "g3");
    assert_eq!(granules["withConflicts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_failed_run_reraises_and_writes_failed_report() {
    let params = ReconciliationParams::new("ORCA Backup", "system-bucket", "reports/run-2.json");
    let store = MemoryReportStore::new();

    let cumulus = vec![
        cumulus_granule("g1", "MOD09GQ___006", &["g1.hdf"]),
        cumulus_granule("g2", "MOD09GQ___006", &["g2.hdf"]),
    ];
    let orca = vec![
        orca_granule("g1", "MOD09GQ___006", &["g1.hdf"]),
        orca_granule("g2", "MOD09GQ___006", &["g2.hdf"]),
        orca_granule("g3", "MOD09GQ___006", &["g3.hdf"]),
    ];

    let err = run_reconciliation(
        &params,
        VecPageSource::new(vec![], 10),
        VecPageSource::new(cumulus, 1),
        VecPageSource::new(orca, 1).with_failure_at_page(1),
        &store,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CirrusError::Catalog { status: 500, .. }));

    let history = store.history();
    assert_eq!(history.len(), 2);

    let failed: serde_json::Value = serde_json::from_str(&history[1].2).unwrap();
    assert_eq!(failed["status"], "Failed");
    assert!(failed.get("createEndTime").is_some());
    assert!(failed["error"]
        .as_str()
        .unwrap()
        .contains("injected failure"));

    // Partial progress before the failure is discarded; the failed report
    // carries the empty aggregate.
    assert_eq!(failed["granules"]["cumulusCount"], 0);
    assert_eq!(failed["granules"]["orcaCount"], 0);
    assert_eq!(failed["granules"]["onlyInCumulus"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_invalid_params_write_nothing() {
    let params = ReconciliationParams::new("ORCA Backup", "", "reports/run-3.json");
    let store = MemoryReportStore::new();

    let err = run_reconciliation(
        &params,
        VecPageSource::<CollectionConfigRecord>::new(vec![], 10),
        VecPageSource::<CumulusGranuleRecord>::new(vec![], 10),
        VecPageSource::<OrcaGranuleRecord>::new(vec![], 10),
        &store,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CirrusError::InvalidParams(_)));
    assert!(store.history().is_empty());
}

#[tokio::test]
async fn test_empty_holdings_produce_empty_success_report() {
    let params = ReconciliationParams::new("ORCA Backup", "system-bucket", "reports/run-4.json");
    let store = MemoryReportStore::new();

    run_reconciliation(
        &params,
        VecPageSource::<CollectionConfigRecord>::new(vec![], 10),
        VecPageSource::<CumulusGranuleRecord>::new(vec![], 10),
        VecPageSource::<OrcaGranuleRecord>::new(vec![], 10),
        &store,
    )
    .await
    .unwrap();

    let reports = latest_reports(&store.history());
    let report = &reports[&(
        "system-bucket".to_string(),
        "reports/run-4.json".to_string(),
    )];
    assert_eq!(report.status, ReportStatus::Success);
    assert!(report.create_end_time.is_some());
    assert_eq!(report.granules.cumulus_count, 0);
    assert_eq!(report.granules.orca_count, 0);
    assert_eq!(report.granules.ok_count, 0);
}
