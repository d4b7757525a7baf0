//! Record multiset for one zone from one side of a sync

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zonesync_provider::{CanonicalRecord, IdentityKey};

/// Unordered multiset of canonical records.
///
/// Exact duplicates are kept: two records with the same identity key count twice.
/// Equality compares multiplicities, not order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCollection {
    records: Vec<CanonicalRecord>,
}

impl RecordCollection {
    #[must_use]
    pub fn new(records: Vec<CanonicalRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRecord> {
        self.records.iter()
    }

    /// Multiplicity of every identity key.
    pub fn counts(&self) -> BTreeMap<IdentityKey, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.identity_key()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of records with the given identity key.
    pub fn count_of(&self, key: &IdentityKey) -> usize {
        self.records
            .iter()
            .filter(|r| &r.identity_key() == key)
            .count()
    }
}

impl PartialEq for RecordCollection {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.counts() == other.counts()
    }
}

impl Eq for RecordCollection {}

impl FromIterator<CanonicalRecord> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = CanonicalRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a CanonicalRecord;
    type IntoIter = std::slice::Iter<'a, CanonicalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for RecordCollection {
    type Item = CanonicalRecord;
    type IntoIter = std::vec::IntoIter<CanonicalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
