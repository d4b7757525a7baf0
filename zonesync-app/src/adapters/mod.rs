//! File-backed and logging adapters for the CLI.

mod file_snapshot_writer;
mod json_zone_store;
mod log_run_reporter;

pub use file_snapshot_writer::FileSnapshotWriter;
pub use json_zone_store::JsonZoneStore;
pub use log_run_reporter::LogRunReporter;

/// Zone names that stay inside an adapter directory when used in a file name.
fn is_usable_file_zone(zone: &str) -> bool {
    !zone.is_empty() && !zone.starts_with('.') && !zone.contains(['/', '\\'])
}
