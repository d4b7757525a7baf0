//! Run options, snapshots and per-zone / per-run reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zonesync_provider::SourceRecord;

/// Default width of the cross-zone worker pool.
pub const DEFAULT_MAX_CONCURRENT_ZONES: usize = 4;

/// Options for one sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunOptions {
    /// Compute edit sets without touching the target store
    pub dry_run: bool,
    /// Only sync these zones (matched case-insensitively, trailing dot ignored)
    pub include_zones: Option<Vec<String>>,
    /// Maximum number of zones processed at the same time
    pub max_concurrent_zones: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            include_zones: None,
            max_concurrent_zones: DEFAULT_MAX_CONCURRENT_ZONES,
        }
    }
}

/// Raw source records of one zone, captured before normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSnapshot {
    pub zone: String,
    pub account_id: String,
    pub captured_at: DateTime<Utc>,
    pub records: Vec<SourceRecord>,
}

/// Outcome of one zone
///
/// `added`/`removed` count mutations that reached the target store, including the
/// ones made before a fatal error. `planned_*` are the sizes of the edit set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneReport {
    pub zone: String,
    pub account_id: String,
    pub added: usize,
    pub removed: usize,
    pub planned_adds: usize,
    pub planned_removes: usize,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ZoneReport {
    pub fn new(zone: impl Into<String>, account_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            zone: zone.into(),
            account_id: account_id.into(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the target store already matched the source
    pub fn is_converged(&self) -> bool {
        !self.is_failed() && self.planned_adds == 0 && self.planned_removes == 0
    }
}

/// A failure recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    pub account_id: String,
    /// `None` when the account itself failed (e.g. zone listing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub message: String,
}

/// Aggregate totals of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub zones_processed: usize,
    pub zones_failed: usize,
    pub accounts_failed: usize,
    pub records_added: usize,
    pub records_removed: usize,
    pub planned_adds: usize,
    pub planned_removes: usize,
    pub failures: Vec<RunFailure>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
