//! File-backed target store.
//!
//! One `<zone>.json` file per zone in a directory. Every mutation rewrites the zone
//! file through a temporary file and a rename, so a crash never leaves a half
//! written zone behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use zonesync_provider::{
    CanonicalRecord, ProviderError, Result, TargetRecord, TargetStore, normalize_host_name,
    normalize_zone_name, seed_zone_records,
};

const STORE_ID: &str = "json-files";
const ZONE_FILE_EXT: &str = "json";

/// On-disk layout of one zone file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneFile {
    zone: String,
    records: Vec<TargetRecord>,
}

/// Target store persisting each zone as a JSON file.
pub struct JsonZoneStore {
    directory: PathBuf,
    name_server: Option<String>,
    /// Serializes read-modify-write cycles on zone files
    write_lock: Mutex<()>,
}

impl JsonZoneStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            name_server: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Primary name server written into the SOA / NS of new zones.
    #[must_use]
    pub fn with_name_server(mut self, name_server: Option<String>) -> Self {
        self.name_server = name_server;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn storage_error(detail: impl Into<String>) -> ProviderError {
        ProviderError::StorageError {
            provider: STORE_ID.to_string(),
            detail: detail.into(),
        }
    }

    fn zone_not_found(zone: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: STORE_ID.to_string(),
            zone: zone.to_string(),
            raw_message: None,
        }
    }

    /// Path of a zone file; rejects names that would escape the directory.
    fn zone_path(&self, zone: &str) -> Result<(String, PathBuf)> {
        let zone = normalize_zone_name(zone);
        if !super::is_usable_file_zone(&zone) {
            return Err(ProviderError::InvalidParameter {
                provider: STORE_ID.to_string(),
                param: "zone".to_string(),
                detail: format!("unusable zone name {zone:?}"),
            });
        }
        let path = self.directory.join(format!("{zone}.{ZONE_FILE_EXT}"));
        Ok((zone, path))
    }

    async fn read_zone(&self, zone: &str) -> Result<(PathBuf, ZoneFile)> {
        let (zone, path) = self.zone_path(zone)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Self::zone_not_found(&zone));
            }
            Err(e) => {
                return Err(Self::storage_error(format!("{}: {e}", path.display())));
            }
        };
        let file = serde_json::from_slice(&bytes)
            .map_err(|e| Self::storage_error(format!("{}: {e}", path.display())))?;
        Ok((path, file))
    }

    async fn write_zone(path: &Path, file: &ZoneFile) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| Self::storage_error(format!("{}: {e}", path.display())))?;
        let tmp = path.with_extension(format!("{ZONE_FILE_EXT}.tmp"));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| Self::storage_error(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| Self::storage_error(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl TargetStore for JsonZoneStore {
    fn id(&self) -> &'static str {
        STORE_ID
    }

    async fn list_zones(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Self::storage_error(format!(
                    "{}: {e}",
                    self.directory.display()
                )));
            }
        };

        let mut zones = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::storage_error(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ZONE_FILE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                zones.push(stem.to_string());
            }
        }
        zones.sort();
        Ok(zones)
    }

    async fn create_zone(&self, zone: &str) -> Result<()> {
        let (zone, path) = self.zone_path(zone)?;
        let _guard = self.write_lock.lock().await;

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Self::storage_error(format!("{}: {e}", path.display())))?;
        if exists {
            return Err(ProviderError::ZoneExists {
                provider: STORE_ID.to_string(),
                zone,
            });
        }
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| Self::storage_error(format!("{}: {e}", self.directory.display())))?;

        log::debug!("[{zone}] creating {}", path.display());
        let file = ZoneFile {
            records: seed_zone_records(&zone, self.name_server.as_deref()),
            zone,
        };
        Self::write_zone(&path, &file).await
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<TargetRecord>> {
        let (_, file) = self.read_zone(zone).await?;
        Ok(file.records)
    }

    async fn list_records_by_host_name(
        &self,
        zone: &str,
        host_name: &str,
    ) -> Result<Vec<TargetRecord>> {
        let host = normalize_host_name(host_name);
        let records = self.list_records(zone).await?;
        Ok(records
            .into_iter()
            .filter(|r| normalize_host_name(&r.host_name) == host)
            .collect())
    }

    async fn create_record(&self, zone: &str, record: &CanonicalRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let (path, mut file) = self.read_zone(zone).await?;
        file.records.push(TargetRecord::from_canonical(
            uuid::Uuid::new_v4().to_string(),
            record,
        ));
        Self::write_zone(&path, &file).await
    }

    async fn delete_record(&self, zone: &str, record: &TargetRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let (path, mut file) = self.read_zone(zone).await?;
        let Some(pos) = file.records.iter().position(|r| r.id == record.id) else {
            return Err(ProviderError::RecordNotFound {
                provider: STORE_ID.to_string(),
                record_id: record.id.clone(),
                raw_message: None,
            });
        };
        file.records.remove(pos);
        Self::write_zone(&path, &file).await
    }
}
