//! Report lifecycle orchestration.
//!
//! A run writes the report object twice: a `Pending` placeholder before any
//! work, then a final `SUCCESS` or `Failed` overwrite at the same key. A
//! failed run reports the empty aggregate rather than whatever the driver
//! accumulated before the error, so readers never see partial counts
//! presented as results.

use chrono::Utc;
use tracing::{error, info};

use cirrus_core::{
    CirrusResult, CumulusGranuleRecord, OrcaGranuleRecord, PageSource, ReportStatus,
    SortedRecordQueue,
};

use crate::driver::reconcile_granules;
use crate::exclusion::{CollectionConfigRecord, ExclusionPolicy};
use crate::params::ReconciliationParams;
use crate::store::ReportStore;

/// Run one full reconciliation and persist its report.
///
/// The three page sources supply collection exclusion configuration, the
/// Cumulus granule cursor, and the ORCA catalog cursor; both granule cursors
/// must be sorted ascending by `(granuleId, collectionId)`. The original
/// error is re-raised after the `Failed` report write; a failure of that
/// final write itself is logged and swallowed so it never masks the cause.
pub async fn run_reconciliation<K, C, O, S>(
    params: &ReconciliationParams,
    collection_source: K,
    cumulus_source: C,
    orca_source: O,
    store: &S,
) -> CirrusResult<()>
where
    K: PageSource<Item = CollectionConfigRecord> + Send,
    C: PageSource<Item = CumulusGranuleRecord> + Send,
    O: PageSource<Item = OrcaGranuleRecord> + Send,
    S: ReportStore + ?Sized,
{
    params.validate()?;

    let mut report = params.initial_report_header();
    store
        .put(&params.system_bucket, &params.report_key, &report)
        .await?;
    info!(
        bucket = %params.system_bucket,
        key = %params.report_key,
        report_type = %params.report_type,
        "wrote pending reconciliation report"
    );

    let outcome = reconcile(collection_source, cumulus_source, orca_source).await;
    report.create_end_time = Some(Utc::now());

    match outcome {
        Ok(granules) => {
            report.status = ReportStatus::Success;
            report.granules = granules;
            store
                .put(&params.system_bucket, &params.report_key, &report)
                .await?;
            info!(
                bucket = %params.system_bucket,
                key = %params.report_key,
                "reconciliation report complete"
            );
            Ok(())
        }
        Err(err) => {
            error!(
                bucket = %params.system_bucket,
                key = %params.report_key,
                error = %err,
                "reconciliation failed"
            );
            report.status = ReportStatus::Failed;
            report.error = Some(err.to_string());
            if let Err(put_err) = store
                .put(&params.system_bucket, &params.report_key, &report)
                .await
            {
                error!(
                    bucket = %params.system_bucket,
                    key = %params.report_key,
                    error = %put_err,
                    "failed to write failed-report marker"
                );
            }
            Err(err)
        }
    }
}

async fn reconcile<K, C, O>(
    collection_source: K,
    cumulus_source: C,
    orca_source: O,
) -> CirrusResult<cirrus_core::GranulesReport>
where
    K: PageSource<Item = CollectionConfigRecord> + Send,
    C: PageSource<Item = CumulusGranuleRecord> + Send,
    O: PageSource<Item = OrcaGranuleRecord> + Send,
{
    let mut collections = SortedRecordQueue::new(collection_source);
    let policy = ExclusionPolicy::load(&mut collections).await?;

    let mut cumulus = SortedRecordQueue::new(cumulus_source);
    let mut orca = SortedRecordQueue::new(orca_source);
    reconcile_granules(&mut cumulus, &mut orca, &policy).await
}
