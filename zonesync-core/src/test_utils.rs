//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use zonesync_provider::{
    CanonicalRecord, InMemoryTargetStore, PaginatedResponse, PaginationParams, ProviderError,
    ProviderType, RecordData, SourceProvider, SourceRecord, SourceZone, TargetRecord, TargetStore,
    ZoneStatus,
};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{InMemorySourceRegistry, RunReporter, SnapshotWriter, SourceRegistry};
use crate::types::{RunSummary, ZoneReport, ZoneSnapshot};

// ===== Record factories =====

pub fn a_record(host: &str, ttl: u32, ip: &str) -> CanonicalRecord {
    CanonicalRecord::new(
        host,
        ttl,
        RecordData::A {
            ipv4_address: ip.to_string(),
        },
    )
}

pub fn source_record(name: &str, record_type: &str, ttl: u32, content: &str) -> SourceRecord {
    SourceRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        record_type: record_type.to_string(),
        ttl,
        content: content.to_string(),
        priority: None,
        srv: None,
    }
}

pub fn target_record(
    host_name: &str,
    record_type: &str,
    ttl: u32,
    fields: &[(&str, &str)],
) -> TargetRecord {
    TargetRecord {
        id: uuid::Uuid::new_v4().to_string(),
        host_name: host_name.to_string(),
        record_type: record_type.to_string(),
        ttl,
        data: fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

// ===== MockSource =====

/// 数据源 mock：zone id 为 `id-<zone>`
#[derive(Default)]
pub struct MockSource {
    zones: Vec<SourceZone>,
    records: HashMap<String, Vec<SourceRecord>>,
    fail_listing: bool,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_zone(mut self, name: &str, records: Vec<SourceRecord>) -> Self {
        let id = format!("id-{name}");
        self.zones.push(SourceZone {
            id: id.clone(),
            name: name.to_string(),
            provider: ProviderType::Cloudflare,
            status: ZoneStatus::Active,
            record_count: None,
        });
        self.records.insert(id, records);
        self
    }

    /// zone 列表返回凭证错误
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

#[async_trait]
impl SourceProvider for MockSource {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn validate_credentials(&self) -> zonesync_provider::Result<bool> {
        Ok(!self.fail_listing)
    }

    async fn list_zones(
        &self,
        params: &PaginationParams,
    ) -> zonesync_provider::Result<PaginatedResponse<SourceZone>> {
        if self.fail_listing {
            return Err(ProviderError::InvalidCredentials {
                provider: "mock".to_string(),
                raw_message: None,
            });
        }
        let items = if params.page == 1 {
            self.zones.clone()
        } else {
            Vec::new()
        };
        let total = u32::try_from(self.zones.len()).unwrap_or(u32::MAX);
        Ok(PaginatedResponse::new(items, params.page, total.max(1), total))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        params: &PaginationParams,
    ) -> zonesync_provider::Result<PaginatedResponse<SourceRecord>> {
        let Some(records) = self.records.get(zone_id) else {
            return Err(ProviderError::ZoneNotFound {
                provider: "mock".to_string(),
                zone: zone_id.to_string(),
                raw_message: None,
            });
        };
        let items = if params.page == 1 {
            records.clone()
        } else {
            Vec::new()
        };
        let total = u32::try_from(records.len()).unwrap_or(u32::MAX);
        Ok(PaginatedResponse::new(items, params.page, total.max(1), total))
    }
}

// ===== FailingTargetStore =====

/// 包装 `InMemoryTargetStore`，按条件注入写入失败
pub struct FailingTargetStore {
    inner: InMemoryTargetStore,
    fail_create_for: Option<String>,
    fail_deletes: bool,
}

impl FailingTargetStore {
    pub fn new(inner: InMemoryTargetStore) -> Self {
        Self {
            inner,
            fail_create_for: None,
            fail_deletes: false,
        }
    }

    /// 创建值为 `value` 的记录时失败
    #[must_use]
    pub fn fail_create_for(mut self, value: &str) -> Self {
        self.fail_create_for = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn fail_all_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    fn injected(detail: &str) -> ProviderError {
        ProviderError::StorageError {
            provider: "memory".to_string(),
            detail: detail.to_string(),
        }
    }
}

#[async_trait]
impl TargetStore for FailingTargetStore {
    fn id(&self) -> &'static str {
        "failing"
    }

    async fn list_zones(&self) -> zonesync_provider::Result<Vec<String>> {
        self.inner.list_zones().await
    }

    async fn create_zone(&self, zone: &str) -> zonesync_provider::Result<()> {
        self.inner.create_zone(zone).await
    }

    async fn list_records(&self, zone: &str) -> zonesync_provider::Result<Vec<TargetRecord>> {
        self.inner.list_records(zone).await
    }

    async fn list_records_by_host_name(
        &self,
        zone: &str,
        host_name: &str,
    ) -> zonesync_provider::Result<Vec<TargetRecord>> {
        self.inner.list_records_by_host_name(zone, host_name).await
    }

    async fn create_record(
        &self,
        zone: &str,
        record: &CanonicalRecord,
    ) -> zonesync_provider::Result<()> {
        if self.fail_create_for.as_deref() == Some(record.data().display_value()) {
            return Err(Self::injected("create rejected"));
        }
        self.inner.create_record(zone, record).await
    }

    async fn delete_record(
        &self,
        zone: &str,
        record: &TargetRecord,
    ) -> zonesync_provider::Result<()> {
        if self.fail_deletes {
            return Err(Self::injected("delete rejected"));
        }
        self.inner.delete_record(zone, record).await
    }
}

// ===== RecordingReporter =====

#[derive(Default)]
pub struct RecordingReporter {
    zones: RwLock<Vec<ZoneReport>>,
    summaries: RwLock<Vec<RunSummary>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 zone 名排序后的报告
    pub async fn zone_reports(&self) -> Vec<ZoneReport> {
        let mut reports = self.zones.read().await.clone();
        reports.sort_by(|a, b| (&a.zone, &a.account_id).cmp(&(&b.zone, &b.account_id)));
        reports
    }

    pub async fn summaries(&self) -> Vec<RunSummary> {
        self.summaries.read().await.clone()
    }
}

#[async_trait]
impl RunReporter for RecordingReporter {
    async fn zone_finished(&self, report: &ZoneReport) {
        self.zones.write().await.push(report.clone());
    }

    async fn run_finished(&self, summary: &RunSummary) {
        self.summaries.write().await.push(summary.clone());
    }
}

// ===== MemorySnapshotWriter =====

#[derive(Default)]
pub struct MemorySnapshotWriter {
    snapshots: RwLock<Vec<ZoneSnapshot>>,
    prune_calls: RwLock<Vec<DateTime<Utc>>>,
    fail_writes: bool,
}

impl MemorySnapshotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub async fn snapshots(&self) -> Vec<ZoneSnapshot> {
        self.snapshots.read().await.clone()
    }

    pub async fn prune_count(&self) -> usize {
        self.prune_calls.read().await.len()
    }
}

#[async_trait]
impl SnapshotWriter for MemorySnapshotWriter {
    async fn write(&self, snapshot: &ZoneSnapshot) -> CoreResult<()> {
        if self.fail_writes {
            return Err(CoreError::SnapshotError("disk full".to_string()));
        }
        self.snapshots.write().await.push(snapshot.clone());
        Ok(())
    }

    async fn prune(&self, now: DateTime<Utc>) -> CoreResult<usize> {
        self.prune_calls.write().await.push(now);
        Ok(0)
    }
}

// ===== ServiceContext factory =====

/// 测试环境：注册表、目标存储、快照与报告
pub struct TestEnv {
    pub registry: Arc<InMemorySourceRegistry>,
    pub store: Arc<InMemoryTargetStore>,
    pub snapshots: Arc<MemorySnapshotWriter>,
    pub reporter: Arc<RecordingReporter>,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::with_snapshots(MemorySnapshotWriter::new())
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: MemorySnapshotWriter) -> Self {
        Self {
            registry: Arc::new(InMemorySourceRegistry::new()),
            store: Arc::new(InMemoryTargetStore::new()),
            snapshots: Arc::new(snapshots),
            reporter: Arc::new(RecordingReporter::new()),
        }
    }

    pub async fn register(&self, account_id: &str, source: MockSource) {
        self.registry
            .register(account_id.to_string(), Arc::new(source))
            .await;
    }

    pub fn context(&self) -> Arc<ServiceContext> {
        self.context_with_store(self.store.clone())
    }

    pub fn context_with_store(&self, store: Arc<dyn TargetStore>) -> Arc<ServiceContext> {
        Arc::new(ServiceContext::new(
            self.registry.clone(),
            store,
            Some(self.snapshots.clone() as Arc<dyn SnapshotWriter>),
            self.reporter.clone(),
        ))
    }
}
