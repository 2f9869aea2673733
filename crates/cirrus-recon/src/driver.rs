//! Merge-join driver over the two granule holdings.
//!
//! Walks the Cumulus queue and the ORCA queue in lockstep by
//! `(granuleId, collectionId)` key. Three logical phases: matching while
//! both queues have a head, then draining whichever side remains. Every
//! granule pulled from either queue is classified exactly once, so the
//! aggregate is built in strict key order with O(1) memory beyond the page
//! buffers and the accumulated conflict lists.

use std::cmp::Ordering;

use tracing::info;

use cirrus_core::{
    CirrusResult, CumulusGranuleRecord, GranulesReport, OrcaGranuleRecord, PageSource,
    SortedRecordQueue,
};

use crate::compare::{granule_report, orca_only_granule_report};
use crate::exclusion::ExclusionPolicy;

enum MergeStep {
    CumulusOnly,
    OrcaOnly,
    Matched,
    Done,
}

/// Reconcile the granule holdings of the two queues into an aggregate
/// report.
///
/// Both queues must be sorted ascending by the composite granule key with no
/// duplicate keys. Any queue error (page fetch failure, catalog error) is
/// fatal and propagates to the caller.
pub async fn reconcile_granules<C, O>(
    cumulus: &mut SortedRecordQueue<C>,
    orca: &mut SortedRecordQueue<O>,
    policy: &ExclusionPolicy,
) -> CirrusResult<GranulesReport>
where
    C: PageSource<Item = CumulusGranuleRecord> + Send,
    O: PageSource<Item = OrcaGranuleRecord> + Send,
{
    let mut report = GranulesReport::default();

    loop {
        let step = {
            let cumulus_key = cumulus.peek().await?.map(CumulusGranuleRecord::key);
            let orca_key = orca.peek().await?.map(OrcaGranuleRecord::key);
            match (cumulus_key, orca_key) {
                (None, None) => MergeStep::Done,
                (Some(_), None) => MergeStep::CumulusOnly,
                (None, Some(_)) => MergeStep::OrcaOnly,
                (Some(c), Some(o)) => match c.cmp(&o) {
                    Ordering::Less => MergeStep::CumulusOnly,
                    Ordering::Greater => MergeStep::OrcaOnly,
                    Ordering::Equal => MergeStep::Matched,
                },
            }
        };

        match step {
            MergeStep::Done => break,
            MergeStep::CumulusOnly => {
                if let Some(granule) = cumulus.shift().await? {
                    report.fold(granule_report(policy, &granule, None), false);
                    report.cumulus_count += 1;
                }
            }
            MergeStep::OrcaOnly => {
                if let Some(granule) = orca.shift().await? {
                    report.add_orca_only(orca_only_granule_report(&granule));
                    report.orca_count += 1;
                }
            }
            MergeStep::Matched => {
                if let (Some(cumulus_granule), Some(orca_granule)) =
                    (cumulus.shift().await?, orca.shift().await?)
                {
                    report.fold(
                        granule_report(policy, &cumulus_granule, Some(&orca_granule)),
                        true,
                    );
                    report.cumulus_count += 1;
                    report.orca_count += 1;
                }
            }
        }
    }

    info!(
        ok_count = report.ok_count,
        cumulus_count = report.cumulus_count,
        orca_count = report.orca_count,
        ok_files_count = report.ok_files_count,
        cumulus_files_count = report.cumulus_files_count,
        orca_files_count = report.orca_files_count,
        conflict_files_count = report.conflict_files_count,
        with_conflicts = report.with_conflicts.len(),
        only_in_cumulus = report.only_in_cumulus.len(),
        only_in_orca = report.only_in_orca.len(),
        "granule reconciliation complete"
    );
    Ok(report)
}
