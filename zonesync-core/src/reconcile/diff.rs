//! Multiset diff between the target and source collections

use std::collections::BTreeMap;

use zonesync_provider::{CanonicalRecord, IdentityKey};

use crate::types::RecordCollection;

/// Records to delete from and create in the target store.
///
/// Both lists are sorted by identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    pub to_remove: Vec<CanonicalRecord>,
    pub to_add: Vec<CanonicalRecord>,
}

impl EditSet {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// For every identity key with target count `t` and source count `s`, emit
/// `max(t - s, 0)` removals and `max(s - t, 0)` additions.
///
/// A changed TTL or field is a different key, so it always shows up as one
/// removal plus one addition.
pub fn diff(target: &RecordCollection, source: &RecordCollection) -> EditSet {
    // key -> (representative, target count, source count)
    let mut tally: BTreeMap<IdentityKey, (&CanonicalRecord, usize, usize)> = BTreeMap::new();
    for record in target {
        tally.entry(record.identity_key()).or_insert((record, 0, 0)).1 += 1;
    }
    for record in source {
        tally.entry(record.identity_key()).or_insert((record, 0, 0)).2 += 1;
    }

    let mut edits = EditSet::default();
    for (record, t, s) in tally.into_values() {
        let removals = t.saturating_sub(s);
        let additions = s.saturating_sub(t);
        edits
            .to_remove
            .extend(std::iter::repeat_n(record, removals).cloned());
        edits.to_add.extend(std::iter::repeat_n(record, additions).cloned());
    }
    edits
}
