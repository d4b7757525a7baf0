//! Run reporting abstract Trait

use async_trait::async_trait;

use crate::types::{RunSummary, ZoneReport};

/// Receives per-zone results and the run totals.
///
/// Called from zone workers concurrently; implementations must not assume ordering
/// between zones.
#[async_trait]
pub trait RunReporter: Send + Sync {
    async fn zone_finished(&self, report: &ZoneReport);

    async fn run_finished(&self, summary: &RunSummary);
}
