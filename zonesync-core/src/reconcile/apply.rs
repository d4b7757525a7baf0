//! Apply an edit set to the target store
//!
//! Callers run [`apply_removes`] to completion before [`apply_adds`] so that every
//! removal query observes the zone as it was before any record was created.

use std::fmt;

use zonesync_provider::{CanonicalRecord, TargetRecord, TargetStore};

use crate::error::CoreError;
use crate::reconcile::normalize::normalize_target_record;

/// A fatal apply error together with the mutations that went through before it.
#[derive(Debug)]
pub struct PartialApply {
    pub applied: usize,
    pub error: CoreError,
}

impl fmt::Display for PartialApply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} applied)", self.error, self.applied)
    }
}

impl std::error::Error for PartialApply {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Create every record; stops at the first failure.
pub async fn apply_adds(
    zone: &str,
    to_add: &[CanonicalRecord],
    store: &dyn TargetStore,
) -> Result<usize, PartialApply> {
    for (applied, record) in to_add.iter().enumerate() {
        log::debug!("[{zone}] create {record}");
        if let Err(cause) = store.create_record(zone, record).await {
            return Err(PartialApply {
                applied,
                error: CoreError::Apply {
                    zone: zone.to_string(),
                    record: record.clone(),
                    cause,
                },
            });
        }
    }
    Ok(to_add.len())
}

/// Delete one target record per entry of `to_remove`; stops at the first failure.
pub async fn apply_removes(
    zone: &str,
    to_remove: &[CanonicalRecord],
    store: &dyn TargetStore,
) -> Result<usize, PartialApply> {
    for (applied, record) in to_remove.iter().enumerate() {
        let fail = |error| PartialApply { applied, error };

        let raw = store
            .list_records_by_host_name(zone, record.host_name())
            .await
            .map_err(|e| fail(CoreError::Provider(e)))?;
        let Some(victim) = select_removal_target(zone, record, raw) else {
            return Err(fail(CoreError::RecordNotFoundForRemoval {
                zone: zone.to_string(),
                host_name: record.host_name().to_string(),
            }));
        };

        log::debug!("[{zone}] delete {record} (id {})", victim.id);
        store
            .delete_record(zone, &victim)
            .await
            .map_err(|cause| {
                fail(CoreError::Apply {
                    zone: zone.to_string(),
                    record: record.clone(),
                    cause,
                })
            })?;
    }
    Ok(to_remove.len())
}

/// Pick the raw record to delete for `record` among the records sharing its host name.
///
/// Candidates are the raw records that normalize to a canonical record; SOA, apex NS
/// and records that fail to normalize are skipped. A single candidate is the target;
/// with several (round-robin), the first one equal to `record` in every field is.
pub fn select_removal_target(
    zone: &str,
    record: &CanonicalRecord,
    raw: Vec<TargetRecord>,
) -> Option<TargetRecord> {
    let mut candidates: Vec<(TargetRecord, CanonicalRecord)> = raw
        .into_iter()
        .filter_map(|r| match normalize_target_record(zone, &r) {
            Ok(Some(canonical)) => Some((r, canonical)),
            Ok(None) => None,
            Err(e) => {
                log::debug!("[{zone}] skipping removal candidate {}: {e}", r.id);
                None
            }
        })
        .collect();

    if candidates.len() == 1 {
        return candidates.pop().map(|(raw, _)| raw);
    }
    candidates
        .into_iter()
        .find(|(_, canonical)| canonical == record)
        .map(|(raw, _)| raw)
}
