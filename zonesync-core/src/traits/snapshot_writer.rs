//! Snapshot storage abstract Trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::ZoneSnapshot;

/// Persists raw source records per zone per run.
///
/// Platform implementation:
/// - `FileSnapshotWriter` (zonesync-app): one JSON file per zone per run
#[async_trait]
pub trait SnapshotWriter: Send + Sync {
    /// Persist one snapshot
    async fn write(&self, snapshot: &ZoneSnapshot) -> CoreResult<()>;

    /// Delete snapshots older than the configured retention, relative to `now`.
    ///
    /// Returns the number of snapshots deleted.
    async fn prune(&self, now: DateTime<Utc>) -> CoreResult<usize>;
}
