//! Application bootstrap for zonesync.
//!
//! Provides `SyncConfig` (the configuration file), `AppStateBuilder` (adapter
//! injection) and `AppState` (the wired sync service).

pub mod adapters;
pub mod config;

use std::sync::Arc;

use zonesync_core::error::{CoreError, CoreResult};
use zonesync_core::services::{ServiceContext, SyncService};
use zonesync_core::traits::{
    InMemorySourceRegistry, RunReporter, SnapshotWriter, SourceRegistry, TargetStore,
};
use zonesync_core::types::{RunOptions, RunSummary, ZoneReport};
use zonesync_provider::{InMemoryTargetStore, create_source};

use crate::adapters::{FileSnapshotWriter, JsonZoneStore, LogRunReporter};
use crate::config::{ConfigError, SyncConfig, TargetConfig};

/// Wired application state.
///
/// Every frontend constructs this once at startup via `AppStateBuilder` or
/// [`AppState::from_config`].
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Sync service
    pub sync_service: SyncService,
}

impl AppState {
    /// Build the state described by a configuration file and register its accounts.
    pub async fn from_config(config: &SyncConfig) -> Result<Self, ConfigError> {
        let registry = Arc::new(InMemorySourceRegistry::new());
        for account in &config.accounts {
            let source = create_source(account.credentials.clone(), config.retry).map_err(
                |source| ConfigError::Source {
                    account_id: account.id.clone(),
                    source,
                },
            )?;
            registry.register(account.id.clone(), source).await;
        }

        let target_store: Arc<dyn TargetStore> = match &config.target {
            TargetConfig::JsonFiles {
                directory,
                name_server,
            } => Arc::new(JsonZoneStore::new(directory).with_name_server(name_server.clone())),
            TargetConfig::Memory => Arc::new(InMemoryTargetStore::new()),
        };

        let mut builder = AppStateBuilder::new()
            .source_registry(registry)
            .target_store(target_store);
        if let Some(snapshot) = &config.snapshot {
            builder = builder.snapshot_writer(Arc::new(FileSnapshotWriter::new(
                &snapshot.directory,
                snapshot.retention_days,
            )));
        }

        builder
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Run a full sync.
    pub async fn run(&self, options: &RunOptions) -> CoreResult<RunSummary> {
        self.sync_service.run(options).await
    }

    /// Sync a single zone of one account.
    pub async fn sync_zone(
        &self,
        account_id: &str,
        zone: &str,
        dry_run: bool,
    ) -> CoreResult<ZoneReport> {
        self.sync_service.sync_zone(account_id, zone, dry_run).await
    }

    /// Check the credentials of every registered account.
    ///
    /// Returns `(account_id, valid)` pairs sorted by account id.
    pub async fn validate_accounts(&self) -> Vec<(String, bool)> {
        let mut results = Vec::new();
        for account_id in self.ctx.source_registry.list_account_ids().await {
            let valid = match self.ctx.get_source(&account_id).await {
                Ok(source) => source.validate_credentials().await.unwrap_or_else(|e| {
                    log::warn!("Account {account_id}: credential check failed: {e}");
                    false
                }),
                Err(_) => false,
            };
            results.push((account_id, valid));
        }
        results
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `target_store`: where zones are replicated to
///
/// # Optional
/// - `source_registry`: defaults to an empty `InMemorySourceRegistry`
/// - `snapshot_writer`: no snapshots when absent
/// - `run_reporter`: defaults to `LogRunReporter`
pub struct AppStateBuilder {
    source_registry: Option<Arc<dyn SourceRegistry>>,
    target_store: Option<Arc<dyn TargetStore>>,
    snapshot_writer: Option<Arc<dyn SnapshotWriter>>,
    run_reporter: Option<Arc<dyn RunReporter>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source_registry: None,
            target_store: None,
            snapshot_writer: None,
            run_reporter: None,
        }
    }

    #[must_use]
    pub fn source_registry(mut self, registry: Arc<dyn SourceRegistry>) -> Self {
        self.source_registry = Some(registry);
        self
    }

    #[must_use]
    pub fn target_store(mut self, store: Arc<dyn TargetStore>) -> Self {
        self.target_store = Some(store);
        self
    }

    #[must_use]
    pub fn snapshot_writer(mut self, writer: Arc<dyn SnapshotWriter>) -> Self {
        self.snapshot_writer = Some(writer);
        self
    }

    #[must_use]
    pub fn run_reporter(mut self, reporter: Arc<dyn RunReporter>) -> Self {
        self.run_reporter = Some(reporter);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let target_store = self
            .target_store
            .ok_or_else(|| CoreError::ValidationError("target_store is required".to_string()))?;
        let source_registry = self
            .source_registry
            .unwrap_or_else(|| Arc::new(InMemorySourceRegistry::new()));
        let run_reporter = self
            .run_reporter
            .unwrap_or_else(|| Arc::new(LogRunReporter::new()));

        let ctx = Arc::new(ServiceContext::new(
            source_registry,
            target_store,
            self.snapshot_writer,
            run_reporter,
        ));
        let sync_service = SyncService::new(Arc::clone(&ctx));

        Ok(AppState { ctx, sync_service })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
