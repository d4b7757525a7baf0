//! Folds per-zone reports into run totals

use chrono::{DateTime, Utc};

use crate::types::{RunFailure, RunSummary, ZoneReport};

/// Accumulates explicit per-zone results; owned by the run, never shared between workers.
#[derive(Debug)]
pub struct RunAggregator {
    run_id: String,
    started_at: DateTime<Utc>,
    dry_run: bool,
    zones_processed: usize,
    zones_failed: usize,
    accounts_failed: usize,
    records_added: usize,
    records_removed: usize,
    planned_adds: usize,
    planned_removes: usize,
    failures: Vec<RunFailure>,
}

impl RunAggregator {
    pub fn new(run_id: impl Into<String>, started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            run_id: run_id.into(),
            started_at,
            dry_run,
            zones_processed: 0,
            zones_failed: 0,
            accounts_failed: 0,
            records_added: 0,
            records_removed: 0,
            planned_adds: 0,
            planned_removes: 0,
            failures: Vec::new(),
        }
    }

    /// Record the outcome of one zone.
    pub fn record_zone(&mut self, report: &ZoneReport) {
        self.zones_processed += 1;
        self.records_added += report.added;
        self.records_removed += report.removed;
        self.planned_adds += report.planned_adds;
        self.planned_removes += report.planned_removes;
        if let Some(message) = &report.error {
            self.zones_failed += 1;
            self.failures.push(RunFailure {
                account_id: report.account_id.clone(),
                zone: Some(report.zone.clone()),
                message: message.clone(),
            });
        }
    }

    /// Record an account whose zones could not be listed.
    pub fn record_account_failure(&mut self, account_id: &str, message: impl Into<String>) {
        self.accounts_failed += 1;
        self.failures.push(RunFailure {
            account_id: account_id.to_string(),
            zone: None,
            message: message.into(),
        });
    }

    /// Fold a batch of zone reports.
    #[must_use]
    pub fn with_zones<'a>(mut self, reports: impl IntoIterator<Item = &'a ZoneReport>) -> Self {
        for report in reports {
            self.record_zone(report);
        }
        self
    }

    pub fn finish(mut self, finished_at: DateTime<Utc>) -> RunSummary {
        self.failures.sort_by(|a, b| {
            (a.account_id.as_str(), a.zone.as_deref()).cmp(&(b.account_id.as_str(), b.zone.as_deref()))
        });
        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at,
            dry_run: self.dry_run,
            zones_processed: self.zones_processed,
            zones_failed: self.zones_failed,
            accounts_failed: self.accounts_failed,
            records_added: self.records_added,
            records_removed: self.records_removed,
            planned_adds: self.planned_adds,
            planned_removes: self.planned_removes,
            failures: self.failures,
        }
    }
}
