//! Run reporter writing to the `log` facade.

use async_trait::async_trait;
use zonesync_core::traits::RunReporter;
use zonesync_core::types::{RunSummary, ZoneReport};

/// Logs every zone outcome and the run summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRunReporter;

impl LogRunReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RunReporter for LogRunReporter {
    async fn zone_finished(&self, report: &ZoneReport) {
        let mode = if report.dry_run { " (dry run)" } else { "" };
        match &report.error {
            Some(error) => log::warn!(
                "[{}] account {}: failed after +{} -{}{mode}: {error}",
                report.zone,
                report.account_id,
                report.added,
                report.removed
            ),
            None => log::info!(
                "[{}] account {}: planned +{} -{}, applied +{} -{}{mode}",
                report.zone,
                report.account_id,
                report.planned_adds,
                report.planned_removes,
                report.added,
                report.removed
            ),
        }
    }

    async fn run_finished(&self, summary: &RunSummary) {
        let elapsed = summary.finished_at - summary.started_at;
        log::info!(
            "Run {} finished in {} ms: {} zones ({} failed), {} accounts failed, +{} -{} records",
            summary.run_id,
            elapsed.num_milliseconds(),
            summary.zones_processed,
            summary.zones_failed,
            summary.accounts_failed,
            summary.records_added,
            summary.records_removed
        );
        for failure in &summary.failures {
            log::warn!(
                "  {} / {}: {}",
                failure.account_id,
                failure.zone.as_deref().unwrap_or("-"),
                failure.message
            );
        }
    }
}
