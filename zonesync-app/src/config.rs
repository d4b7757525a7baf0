//! Sync configuration file.
//!
//! ```json
//! {
//!   "accounts": [
//!     { "id": "cf-main", "credentials": { "provider": "cloudflare", "credentials": { "apiToken": "..." } } }
//!   ],
//!   "target": { "kind": "jsonFiles", "directory": "/var/lib/zonesync/zones" },
//!   "snapshot": { "directory": "/var/lib/zonesync/snapshots", "retentionDays": 30 },
//!   "maxConcurrentZones": 4
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zonesync_core::types::{DEFAULT_MAX_CONCURRENT_ZONES, RunOptions};
use zonesync_provider::{ProviderCredentials, ProviderError, RetryPolicy};

/// Default snapshot retention in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Errors raised while loading configuration or wiring adapters from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to create source for account {account_id}: {source}")]
    Source {
        account_id: String,
        #[source]
        source: ProviderError,
    },
}

/// One cloud source account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub id: String,
    pub credentials: ProviderCredentials,
}

/// Where replicated zones are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetConfig {
    /// One JSON file per zone in `directory`
    JsonFiles {
        directory: PathBuf,
        /// Primary name server written into new zones
        #[serde(rename = "nameServer", default)]
        name_server: Option<String>,
    },
    /// Process memory; useful with `dryRun`
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotConfig {
    pub directory: PathBuf,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

const fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

const fn default_max_concurrent_zones() -> usize {
    DEFAULT_MAX_CONCURRENT_ZONES
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub accounts: Vec<AccountConfig>,
    pub target: TargetConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotConfig>,
    #[serde(default = "default_max_concurrent_zones")]
    pub max_concurrent_zones: usize,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_zones: Option<Vec<String>>,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl SyncConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!(
            "Loaded {} with {} accounts",
            path.display(),
            config.accounts.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.accounts.is_empty() {
            return invalid("at least one account is required".to_string());
        }
        let mut seen = BTreeSet::new();
        for account in &self.accounts {
            if account.id.trim().is_empty() {
                return invalid("account id must not be empty".to_string());
            }
            if !seen.insert(account.id.as_str()) {
                return invalid(format!("duplicate account id {}", account.id));
            }
        }
        if self.max_concurrent_zones == 0 {
            return invalid("maxConcurrentZones must be at least 1".to_string());
        }
        if let Some(snapshot) = &self.snapshot
            && snapshot.retention_days == 0
        {
            return invalid("snapshot.retentionDays must be at least 1".to_string());
        }
        if let TargetConfig::JsonFiles { directory, .. } = &self.target
            && directory.as_os_str().is_empty()
        {
            return invalid("target.directory must not be empty".to_string());
        }
        if self.include_zones.as_ref().is_some_and(Vec::is_empty) {
            return invalid("includeZones is empty, nothing would be synced".to_string());
        }
        Ok(())
    }

    /// Run options derived from this file.
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            include_zones: self.include_zones.clone(),
            max_concurrent_zones: self.max_concurrent_zones,
        }
    }
}
