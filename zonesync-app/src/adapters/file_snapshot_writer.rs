//! JSON snapshot files with retention pruning.
//!
//! Files are named `zonesync_{zone}_{YYYYMMDDTHHMMSSZ}.json`; pruning reads the
//! capture time back from the name, never from file metadata.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use zonesync_core::error::{CoreError, CoreResult};
use zonesync_core::traits::SnapshotWriter;
use zonesync_core::types::ZoneSnapshot;

const FILE_PREFIX: &str = "zonesync_";
const FILE_SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Writes one snapshot file per zone per run.
pub struct FileSnapshotWriter {
    directory: PathBuf,
    retention: Duration,
}

impl FileSnapshotWriter {
    pub fn new(directory: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            directory: directory.into(),
            retention: Duration::days(i64::from(retention_days)),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name of a snapshot.
    pub fn file_name(zone: &str, captured_at: DateTime<Utc>) -> String {
        format!(
            "{FILE_PREFIX}{zone}_{}{FILE_SUFFIX}",
            captured_at.format(TIMESTAMP_FORMAT)
        )
    }

    /// Capture time encoded in a snapshot file name; `None` for foreign files.
    pub fn parse_file_name(name: &str) -> Option<DateTime<Utc>> {
        let stem = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        let (_, timestamp) = stem.rsplit_once('_')?;
        NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|t| t.and_utc())
    }
}

#[async_trait]
impl SnapshotWriter for FileSnapshotWriter {
    async fn write(&self, snapshot: &ZoneSnapshot) -> CoreResult<()> {
        if !super::is_usable_file_zone(&snapshot.zone) {
            return Err(CoreError::SnapshotError(format!(
                "unusable zone name {:?}",
                snapshot.zone
            )));
        }
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                CoreError::SnapshotError(format!("{}: {e}", self.directory.display()))
            })?;

        let path = self
            .directory
            .join(Self::file_name(&snapshot.zone, snapshot.captured_at));
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| CoreError::SnapshotError(e.to_string()))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::SnapshotError(format!("{}: {e}", path.display())))?;

        log::debug!(
            "[{}] snapshot of {} records written to {}",
            snapshot.zone,
            snapshot.records.len(),
            path.display()
        );
        Ok(())
    }

    async fn prune(&self, now: DateTime<Utc>) -> CoreResult<usize> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(CoreError::SnapshotError(format!(
                    "{}: {e}",
                    self.directory.display()
                )));
            }
        };

        let cutoff = now - self.retention;
        let mut pruned = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::SnapshotError(e.to_string()))?
        {
            let name = entry.file_name();
            let Some(captured_at) = name.to_str().and_then(Self::parse_file_name) else {
                continue;
            };
            if captured_at >= cutoff {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => pruned += 1,
                Err(e) => log::warn!("Failed to prune {}: {e}", entry.path().display()),
            }
        }
        Ok(pruned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_round_trips_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let name = FileSnapshotWriter::file_name("example.com", at);
        assert_eq!(name, "zonesync_example.com_20240309T070501Z.json");
        assert_eq!(FileSnapshotWriter::parse_file_name(&name), Some(at));
    }

    #[test]
    fn zone_with_underscore_still_parses() {
        let parsed = FileSnapshotWriter::parse_file_name("zonesync_my_zone.net_20240101T000000Z.json");
        assert!(parsed.is_some());
    }

    #[test]
    fn foreign_files_are_ignored() {
        for name in [
            "notes.txt",
            "zonesync_example.com.json",
            "zonesync_example.com_yesterday.json",
            "other_example.com_20240101T000000Z.json",
        ] {
            assert!(
                FileSnapshotWriter::parse_file_name(name).is_none(),
                "parsed {name}"
            );
        }
    }
}
