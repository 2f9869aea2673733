//! Per-granule comparison between the Cumulus and ORCA holdings.
//!
//! Pure functions over their inputs and the resolved exclusion policy; no
//! network or storage side effects.

use std::collections::BTreeMap;

use cirrus_core::{
    ConflictFile, ConflictReason, CumulusGranuleRecord, GranuleReport, OrcaGranuleRecord,
};

use crate::exclusion::ExclusionPolicy;

/// Compare one Cumulus granule against its backup counterpart, if any.
///
/// File maps are keyed by logical name with last-write-wins on duplicate
/// names, matching the upstream record semantics. For each name in the union
/// of both sides:
///
/// - both sides: excluded suffix is a `shouldBeExcludedFromOrca` conflict,
///   otherwise ok
/// - Cumulus only: excluded suffix is ok (correctly absent from backup),
///   otherwise an `onlyInCumulus` conflict
/// - backup only: always an `onlyInOrca` conflict
#[must_use]
pub fn granule_report(
    policy: &ExclusionPolicy,
    cumulus: &CumulusGranuleRecord,
    orca: Option<&OrcaGranuleRecord>,
) -> GranuleReport {
    let mut report = GranuleReport {
        ok: false,
        ok_files_count: 0,
        cumulus_files_count: 0,
        orca_files_count: 0,
        granule_id: cumulus.granule_id.clone(),
        collection_id: cumulus.collection_id.clone(),
        provider: cumulus.provider.clone(),
        created_at: cumulus.created_at,
        updated_at: cumulus.updated_at,
        conflict_files: Vec::new(),
    };

    // Last write wins on duplicate logical names.
    let mut cumulus_files = BTreeMap::new();
    for file in &cumulus.files {
        cumulus_files.insert(file.file_name().to_string(), file);
    }
    let mut orca_files = BTreeMap::new();
    if let Some(orca) = orca {
        for file in &orca.files {
            orca_files.insert(file.file_name().to_string(), file);
        }
    }

    let mut names: Vec<&String> = cumulus_files.keys().collect();
    for name in orca_files.keys() {
        if !cumulus_files.contains_key(name) {
            names.push(name);
        }
    }
    let union_size = names.len() as u64;

    for name in names {
        match (cumulus_files.get(name), orca_files.get(name)) {
            (Some(cumulus_file), Some(orca_file)) => {
                report.cumulus_files_count += 1;
                report.orca_files_count += 1;
                if policy.is_excluded(&cumulus.collection_id, name) {
                    report.conflict_files.push(ConflictFile {
                        file_name: name.clone(),
                        bucket: cumulus_file.bucket.clone(),
                        key: cumulus_file.key.clone(),
                        orca_bucket: Some(orca_file.orca_archive_location.clone()),
                        reason: ConflictReason::ShouldBeExcludedFromOrca,
                    });
                } else {
                    report.ok_files_count += 1;
                }
            }
            (Some(cumulus_file), None) => {
                report.cumulus_files_count += 1;
                if policy.is_excluded(&cumulus.collection_id, name) {
                    report.ok_files_count += 1;
                } else {
                    report.conflict_files.push(ConflictFile {
                        file_name: name.clone(),
                        bucket: cumulus_file.bucket.clone(),
                        key: cumulus_file.key.clone(),
                        orca_bucket: None,
                        reason: ConflictReason::OnlyInCumulus,
                    });
                }
            }
            (None, Some(orca_file)) => {
                report.orca_files_count += 1;
                report.conflict_files.push(ConflictFile {
                    file_name: name.clone(),
                    bucket: orca_file.cumulus_archive_location.clone(),
                    key: orca_file.key_path.clone(),
                    orca_bucket: Some(orca_file.orca_archive_location.clone()),
                    reason: ConflictReason::OnlyInOrca,
                });
            }
            (None, None) => {}
        }
    }

    report.ok = report.ok_files_count == union_size;
    report
}

/// Report for a granule that exists only in the backup catalog.
///
/// Every backup file is an `onlyInOrca` conflict; the comparator is
/// bypassed since there is no Cumulus side to compare against.
#[must_use]
pub fn orca_only_granule_report(orca: &OrcaGranuleRecord) -> GranuleReport {
    let conflict_files = orca
        .files
        .iter()
        .map(|file| ConflictFile {
            file_name: file.file_name().to_string(),
            bucket: file.cumulus_archive_location.clone(),
            key: file.key_path.clone(),
            orca_bucket: Some(file.orca_archive_location.clone()),
            reason: ConflictReason::OnlyInOrca,
        })
        .collect::<Vec<_>>();

    GranuleReport {
        ok: false,
        ok_files_count: 0,
        cumulus_files_count: 0,
        orca_files_count: orca.files.len() as u64,
        granule_id: orca.id.clone(),
        collection_id: orca.collection_id.clone(),
        provider: orca.provider_id.clone(),
        created_at: orca.created_at,
        updated_at: orca.updated_at,
        conflict_files,
    }
}
