//! Zone replication service
//!
//! Drives a sync run: discovers source zones, rejects zones claimed by more than one
//! account, then reconciles every zone against the target store through a bounded
//! worker pool. Each zone is handled sequentially and its failure never stops the run.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use zonesync_provider::{ProviderError, SourceRecord, normalize_zone_name};

use crate::error::{CoreError, CoreResult};
use crate::reconcile::{
    apply_adds, apply_removes, check_safe, diff, normalize_source, normalize_target,
};
use crate::services::{RunAggregator, ServiceContext};
use crate::types::{RecordCollection, RunOptions, RunSummary, ZoneReport, ZoneSnapshot};

/// 一个待同步的 zone（来源账户 + 数据源 zone id）
#[derive(Debug, Clone)]
struct ZoneJob {
    account_id: String,
    zone_id: String,
    /// 规范化后的 zone 名称
    zone: String,
}

/// 同步服务
pub struct SyncService {
    ctx: Arc<ServiceContext>,
}

impl SyncService {
    /// 创建同步服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 执行一次完整同步
    ///
    /// Only a failure to list the target zones aborts the run; everything else is
    /// recorded in the returned summary.
    pub async fn run(&self, options: &RunOptions) -> CoreResult<RunSummary> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let mut aggregator = RunAggregator::new(run_id.clone(), started_at, options.dry_run);

        log::info!(
            "Sync run {run_id} started (dry run: {}, workers: {})",
            options.dry_run,
            options.max_concurrent_zones.max(1)
        );

        let target_zones = self.target_zone_names().await?;
        let jobs = self.discover_zones(options, &mut aggregator).await;
        let (jobs, conflicts) = split_conflicts(jobs, options.dry_run);

        for report in &conflicts {
            log::warn!(
                "[{}] {}",
                report.zone,
                report.error.as_deref().unwrap_or_default()
            );
            self.ctx.run_reporter.zone_finished(report).await;
            aggregator.record_zone(report);
        }

        let reports: Vec<ZoneReport> = stream::iter(jobs)
            .map(|job| self.process_zone(job, &target_zones, options.dry_run))
            .buffer_unordered(options.max_concurrent_zones.max(1))
            .collect()
            .await;

        self.prune_snapshots().await;

        let summary = aggregator.with_zones(&reports).finish(Utc::now());
        log::info!(
            "Sync run {run_id} finished: {} zones, {} failed, +{} -{} records",
            summary.zones_processed,
            summary.zones_failed,
            summary.records_added,
            summary.records_removed
        );
        self.ctx.run_reporter.run_finished(&summary).await;
        Ok(summary)
    }

    /// 同步单个 zone
    ///
    /// Skips the cross-account conflict check; the caller names the account.
    pub async fn sync_zone(
        &self,
        account_id: &str,
        zone_name: &str,
        dry_run: bool,
    ) -> CoreResult<ZoneReport> {
        let wanted = normalize_zone_name(zone_name);
        let source = self.ctx.get_source(account_id).await?;
        let zones = source
            .list_all_zones()
            .await
            .map_err(|e| self.ctx.handle_provider_error(account_id, e))?;

        let Some(zone) = zones
            .into_iter()
            .find(|z| normalize_zone_name(&z.name) == wanted)
        else {
            return Err(CoreError::Provider(ProviderError::ZoneNotFound {
                provider: source.id().to_string(),
                zone: wanted,
                raw_message: None,
            }));
        };

        let target_zones = self.target_zone_names().await?;
        let job = ZoneJob {
            account_id: account_id.to_string(),
            zone_id: zone.id,
            zone: wanted,
        };
        Ok(self.process_zone(job, &target_zones, dry_run).await)
    }

    // ============ 发现 ============

    async fn target_zone_names(&self) -> CoreResult<BTreeSet<String>> {
        let zones = self.ctx.target_store.list_zones().await?;
        Ok(zones.iter().map(|z| normalize_zone_name(z)).collect())
    }

    /// 列出全部账户的 zone，账户级失败记入汇总
    async fn discover_zones(
        &self,
        options: &RunOptions,
        aggregator: &mut RunAggregator,
    ) -> Vec<ZoneJob> {
        let include: Option<BTreeSet<String>> = options
            .include_zones
            .as_ref()
            .map(|zones| zones.iter().map(|z| normalize_zone_name(z)).collect());

        let mut jobs = Vec::new();
        for account_id in self.ctx.source_registry.list_account_ids().await {
            let zones = match self.ctx.get_source(&account_id).await {
                Ok(source) => source
                    .list_all_zones()
                    .await
                    .map_err(|e| self.ctx.handle_provider_error(&account_id, e)),
                Err(e) => Err(e),
            };
            let zones = match zones {
                Ok(zones) => zones,
                Err(e) => {
                    log::error!("Account {account_id}: zone listing failed: {e}");
                    aggregator.record_account_failure(&account_id, e.to_string());
                    continue;
                }
            };

            log::debug!("Account {account_id}: {} zones", zones.len());
            jobs.extend(
                zones
                    .into_iter()
                    .map(|z| ZoneJob {
                        account_id: account_id.clone(),
                        zone: normalize_zone_name(&z.name),
                        zone_id: z.id,
                    })
                    .filter(|job| include.as_ref().is_none_or(|set| set.contains(&job.zone))),
            );
        }
        jobs
    }

    // ============ 单 zone 处理 ============

    async fn process_zone(
        &self,
        job: ZoneJob,
        target_zones: &BTreeSet<String>,
        dry_run: bool,
    ) -> ZoneReport {
        let mut report = ZoneReport::new(&job.zone, &job.account_id, dry_run);
        let target_exists = target_zones.contains(&job.zone);

        if let Err(e) = self.reconcile_zone(&job, target_exists, &mut report).await {
            if e.is_expected() {
                log::warn!("[{}] sync failed: {e}", job.zone);
            } else {
                log::error!("[{}] sync failed: {e}", job.zone);
            }
            report.error = Some(e.to_string());
        } else if report.is_converged() {
            log::info!("[{}] already in sync", job.zone);
        } else {
            log::info!(
                "[{}] planned +{} -{}, applied +{} -{}",
                job.zone,
                report.planned_adds,
                report.planned_removes,
                report.added,
                report.removed
            );
        }

        self.ctx.run_reporter.zone_finished(&report).await;
        report
    }

    /// normalize → guard → diff → removes → adds
    async fn reconcile_zone(
        &self,
        job: &ZoneJob,
        target_exists: bool,
        report: &mut ZoneReport,
    ) -> CoreResult<()> {
        let zone = job.zone.as_str();
        let source = self.ctx.get_source(&job.account_id).await?;
        let raw_source = source
            .list_all_records(&job.zone_id)
            .await
            .map_err(|e| self.ctx.handle_provider_error(&job.account_id, e))?;

        self.write_snapshot(job, &raw_source).await;

        let source_records = normalize_source(zone, &raw_source)?;
        let target_records = self.load_target(zone, target_exists, report.dry_run).await?;
        check_safe(&target_records, zone)?;

        let edits = diff(&target_records, &source_records);
        report.planned_adds = edits.to_add.len();
        report.planned_removes = edits.to_remove.len();

        if report.dry_run || edits.is_empty() {
            for record in &edits.to_remove {
                log::debug!("[{zone}] would remove {record}");
            }
            for record in &edits.to_add {
                log::debug!("[{zone}] would add {record}");
            }
            return Ok(());
        }

        let store = self.ctx.target_store.as_ref();
        match apply_removes(zone, &edits.to_remove, store).await {
            Ok(removed) => report.removed = removed,
            Err(partial) => {
                report.removed = partial.applied;
                return Err(partial.error);
            }
        }
        match apply_adds(zone, &edits.to_add, store).await {
            Ok(added) => report.added = added,
            Err(partial) => {
                report.added = partial.applied;
                return Err(partial.error);
            }
        }
        Ok(())
    }

    /// 读取目标 zone；不存在时创建（dry run 视为空 zone，不创建）
    async fn load_target(
        &self,
        zone: &str,
        exists: bool,
        dry_run: bool,
    ) -> CoreResult<RecordCollection> {
        let store = &self.ctx.target_store;
        if !exists {
            if dry_run {
                log::info!("[{zone}] missing on target {}, treated as empty", store.id());
                return Ok(RecordCollection::default());
            }
            log::info!("[{zone}] creating zone on target {}", store.id());
            match store.create_zone(zone).await {
                Ok(()) | Err(ProviderError::ZoneExists { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        let raw = store.list_records(zone).await?;
        normalize_target(zone, &raw)
    }

    // ============ 快照 ============

    async fn write_snapshot(&self, job: &ZoneJob, records: &[SourceRecord]) {
        let Some(writer) = &self.ctx.snapshot_writer else {
            return;
        };
        let snapshot = ZoneSnapshot {
            zone: job.zone.clone(),
            account_id: job.account_id.clone(),
            captured_at: Utc::now(),
            records: records.to_vec(),
        };
        if let Err(e) = writer.write(&snapshot).await {
            log::warn!("[{}] snapshot not written: {e}", job.zone);
        }
    }

    async fn prune_snapshots(&self) {
        let Some(writer) = &self.ctx.snapshot_writer else {
            return;
        };
        match writer.prune(Utc::now()).await {
            Ok(0) => {}
            Ok(pruned) => log::info!("Pruned {pruned} expired snapshots"),
            Err(e) => log::warn!("Snapshot pruning failed: {e}"),
        }
    }
}

/// 拆分出被多个账户同时提供的 zone
///
/// Every claimant of a conflicting zone gets a failed report; the zone is not synced.
fn split_conflicts(jobs: Vec<ZoneJob>, dry_run: bool) -> (Vec<ZoneJob>, Vec<ZoneReport>) {
    let mut by_zone: BTreeMap<String, Vec<ZoneJob>> = BTreeMap::new();
    for job in jobs {
        by_zone.entry(job.zone.clone()).or_default().push(job);
    }

    let mut accepted = Vec::new();
    let mut conflicts = Vec::new();
    for (zone, mut claimants) in by_zone {
        let accounts: Vec<String> = claimants
            .iter()
            .map(|job| job.account_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if accounts.len() > 1 {
            let error = CoreError::ZoneConflict {
                zone: zone.clone(),
                accounts: accounts.clone(),
            }
            .to_string();
            conflicts.extend(accounts.into_iter().map(|account_id| {
                let mut report = ZoneReport::new(&zone, account_id, dry_run);
                report.error = Some(error.clone());
                report
            }));
        } else {
            // 同一账户重复列出的 zone 只同步一次
            claimants.truncate(1);
            accepted.extend(claimants);
        }
    }
    (accepted, conflicts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_utils::{
        FailingTargetStore, MemorySnapshotWriter, MockSource, TestEnv, source_record,
        target_record,
    };
    use zonesync_provider::{InMemoryTargetStore, TargetStore, target_fields};

    const ZONE: &str = "example.com";

    fn options() -> RunOptions {
        RunOptions::default()
    }

    fn dry_run() -> RunOptions {
        RunOptions {
            dry_run: true,
            ..RunOptions::default()
        }
    }

    /// 目标 zone 中除 SOA / apex NS 之外的记录，按字符串排序
    async fn target_contents(store: &dyn TargetStore, zone: &str) -> Vec<String> {
        let raw = store.list_records(zone).await.unwrap();
        let mut records: Vec<String> = normalize_target(zone, &raw)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        records.sort();
        records
    }

    fn www_pair() -> MockSource {
        MockSource::new().with_zone(
            ZONE,
            vec![
                source_record("www.example.com", "A", 3600, "1.2.3.4"),
                source_record("www.example.com", "A", 3600, "5.6.7.8"),
            ],
        )
    }

    #[tokio::test]
    async fn first_run_creates_zone_and_second_run_converges() {
        let env = TestEnv::new();
        env.register("acct", www_pair()).await;
        let service = SyncService::new(env.context());

        let first = service.run(&options()).await.unwrap();
        assert_eq!(first.zones_processed, 1);
        assert_eq!(first.records_added, 2);
        assert!(!first.has_failures());
        assert_eq!(target_contents(env.store.as_ref(), ZONE).await.len(), 2);

        let second = service.run(&options()).await.unwrap();
        assert_eq!(second.records_added, 0);
        assert_eq!(second.records_removed, 0);
        assert_eq!(second.planned_adds + second.planned_removes, 0);
    }

    #[tokio::test]
    async fn seeded_soa_and_ns_survive_sync() {
        let env = TestEnv::new();
        env.register("acct", MockSource::new().with_zone(ZONE, Vec::new()))
            .await;
        let service = SyncService::new(env.context());

        let summary = service.run(&options()).await.unwrap();
        assert_eq!(summary.records_removed, 0);

        let raw = env.store.list_records(ZONE).await.unwrap();
        let types: Vec<&str> = raw.iter().map(|r| r.record_type.as_str()).collect();
        assert_eq!(types, vec!["SOA", "NS"]);
    }

    #[tokio::test]
    async fn dry_run_never_mutates_target() {
        let env = TestEnv::new();
        env.register("acct", www_pair()).await;
        let service = SyncService::new(env.context());

        let summary = service.run(&dry_run()).await.unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.planned_adds, 2);
        assert_eq!(summary.records_added, 0);
        assert!(env.store.list_zones().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn round_robin_member_is_added_alongside_existing() {
        let env = TestEnv::new();
        env.store.create_zone(ZONE).await.unwrap();
        env.store
            .insert_raw(
                ZONE,
                target_record(
                    "www",
                    "A",
                    3600,
                    &[(target_fields::IPV4_ADDRESS, "1.2.3.4")],
                ),
            )
            .await;
        env.register("acct", www_pair()).await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.records_added, 1);
        assert_eq!(summary.records_removed, 0);
        assert_eq!(
            target_contents(env.store.as_ref(), ZONE).await,
            vec![
                "A www TTL=3600 1.2.3.4".to_string(),
                "A www TTL=3600 5.6.7.8".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn empty_source_removes_apex_txt() {
        let env = TestEnv::new();
        env.store.create_zone(ZONE).await.unwrap();
        env.store
            .insert_raw(
                ZONE,
                target_record("@", "TXT", 300, &[(target_fields::DESCRIPTIVE_TEXT, "v=spf1 -all")]),
            )
            .await;
        env.register("acct", MockSource::new().with_zone(ZONE, Vec::new()))
            .await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.records_removed, 1);
        assert_eq!(summary.records_added, 0);
        assert!(target_contents(env.store.as_ref(), ZONE).await.is_empty());
    }

    #[tokio::test]
    async fn ttl_change_replaces_record() {
        let env = TestEnv::new();
        env.store.create_zone(ZONE).await.unwrap();
        env.store
            .insert_raw(
                ZONE,
                target_record(
                    "www",
                    "A",
                    3600,
                    &[(target_fields::IPV4_ADDRESS, "1.2.3.4")],
                ),
            )
            .await;
        env.register(
            "acct",
            MockSource::new().with_zone(
                ZONE,
                vec![source_record("www.example.com", "A", 300, "1.2.3.4")],
            ),
        )
        .await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!((summary.records_removed, summary.records_added), (1, 1));
        assert_eq!(
            target_contents(env.store.as_ref(), ZONE).await,
            vec!["A www TTL=300 1.2.3.4".to_string()]
        );
    }

    #[tokio::test]
    async fn collision_blocks_zone_but_keeps_snapshot() {
        let env = TestEnv::new();
        env.store.create_zone(ZONE).await.unwrap();
        env.store
            .insert_raw(
                ZONE,
                target_record(
                    "sub.example.com",
                    "A",
                    300,
                    &[(target_fields::IPV4_ADDRESS, "192.0.2.1")],
                ),
            )
            .await;
        env.register("acct", www_pair()).await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.zones_failed, 1);
        assert_eq!(summary.planned_adds, 0);
        assert_eq!(summary.records_added, 0);
        assert_eq!(target_contents(env.store.as_ref(), ZONE).await.len(), 1);
        assert_eq!(env.snapshots.snapshots().await.len(), 1);
        assert!(summary.failures[0].message.contains("collision"));
    }

    #[tokio::test]
    async fn zone_served_by_two_accounts_is_rejected_for_both() {
        let env = TestEnv::new();
        env.register("alpha", www_pair()).await;
        env.register(
            "beta",
            MockSource::new()
                .with_zone("Example.COM.", Vec::new())
                .with_zone("other.org", Vec::new()),
        )
        .await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.zones_processed, 3);
        assert_eq!(summary.zones_failed, 2);

        let reports = env.reporter.zone_reports().await;
        let conflicted: Vec<&str> = reports
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.account_id.as_str())
            .collect();
        assert_eq!(conflicted, vec!["alpha", "beta"]);
        assert_eq!(env.store.list_zones().await.unwrap(), vec!["other.org"]);
    }

    #[tokio::test]
    async fn failing_account_does_not_stop_others() {
        let env = TestEnv::new();
        env.register("broken", MockSource::new().failing()).await;
        env.register("ok", www_pair()).await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.accounts_failed, 1);
        assert_eq!(summary.zones_processed, 1);
        assert_eq!(summary.records_added, 2);
        assert_eq!(summary.failures[0].account_id, "broken");
        assert!(summary.failures[0].zone.is_none());
    }

    #[tokio::test]
    async fn unsupported_type_fails_only_its_zone() {
        let env = TestEnv::new();
        env.register(
            "acct",
            MockSource::new()
                .with_zone(
                    "bad.net",
                    vec![source_record("bad.net", "CAA", 300, "0 issue \"ca.test\"")],
                )
                .with_zone(
                    ZONE,
                    vec![source_record("www.example.com", "A", 300, "192.0.2.1")],
                ),
        )
        .await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.zones_processed, 2);
        assert_eq!(summary.zones_failed, 1);
        assert_eq!(summary.records_added, 1);
        assert_eq!(summary.failures[0].zone.as_deref(), Some("bad.net"));
        assert!(summary.failures[0].message.contains("CAA"));
    }

    #[tokio::test]
    async fn include_filter_limits_zones() {
        let env = TestEnv::new();
        env.register(
            "acct",
            MockSource::new()
                .with_zone(ZONE, Vec::new())
                .with_zone("other.org", Vec::new()),
        )
        .await;
        let opts = RunOptions {
            include_zones: Some(vec!["OTHER.org.".to_string()]),
            ..RunOptions::default()
        };

        let summary = SyncService::new(env.context()).run(&opts).await.unwrap();
        assert_eq!(summary.zones_processed, 1);
        assert_eq!(env.store.list_zones().await.unwrap(), vec!["other.org"]);
    }

    #[tokio::test]
    async fn snapshot_failure_is_not_fatal() {
        let env = TestEnv::with_snapshots(MemorySnapshotWriter::failing());
        env.register("acct", www_pair()).await;

        let summary = SyncService::new(env.context())
            .run(&options())
            .await
            .unwrap();
        assert!(!summary.has_failures());
        assert_eq!(summary.records_added, 2);
        assert_eq!(env.snapshots.prune_count().await, 1);
    }

    #[tokio::test]
    async fn snapshot_holds_raw_source_records() {
        let env = TestEnv::new();
        env.register("acct", www_pair()).await;
        SyncService::new(env.context())
            .run(&dry_run())
            .await
            .unwrap();

        let snapshots = env.snapshots.snapshots().await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].zone, ZONE);
        assert_eq!(snapshots[0].account_id, "acct");
        assert_eq!(snapshots[0].records.len(), 2);
    }

    #[tokio::test]
    async fn apply_failure_keeps_partial_counts() {
        let env = TestEnv::new();
        let inner = InMemoryTargetStore::new();
        let store = Arc::new(FailingTargetStore::new(inner.clone()).fail_create_for("5.6.7.8"));
        env.register("acct", www_pair()).await;

        let summary = SyncService::new(env.context_with_store(store))
            .run(&options())
            .await
            .unwrap();
        assert_eq!(summary.zones_failed, 1);
        assert_eq!(summary.planned_adds, 2);
        assert_eq!(summary.records_added, 1);
        assert_eq!(target_contents(&inner, ZONE).await.len(), 1);
    }

    #[tokio::test]
    async fn reporter_sees_every_zone_and_the_summary() {
        let env = TestEnv::new();
        env.register(
            "acct",
            MockSource::new()
                .with_zone("a.test", Vec::new())
                .with_zone("b.test", Vec::new())
                .with_zone("c.test", Vec::new()),
        )
        .await;
        let opts = RunOptions {
            max_concurrent_zones: 2,
            ..RunOptions::default()
        };

        let summary = SyncService::new(env.context()).run(&opts).await.unwrap();
        let zones: Vec<String> = env
            .reporter
            .zone_reports()
            .await
            .into_iter()
            .map(|r| r.zone)
            .collect();
        assert_eq!(zones, vec!["a.test", "b.test", "c.test"]);
        assert_eq!(env.reporter.summaries().await, vec![summary]);
    }

    #[tokio::test]
    async fn sync_zone_targets_one_zone() {
        let env = TestEnv::new();
        env.register(
            "acct",
            www_pair().with_zone("other.org", Vec::new()),
        )
        .await;
        let service = SyncService::new(env.context());

        let report = service.sync_zone("acct", "Example.com.", false).await.unwrap();
        assert_eq!(report.zone, ZONE);
        assert_eq!(report.added, 2);
        assert_eq!(env.store.list_zones().await.unwrap(), vec![ZONE]);

        let missing = service.sync_zone("acct", "nowhere.io", false).await;
        assert!(matches!(
            missing,
            Err(CoreError::Provider(ProviderError::ZoneNotFound { .. }))
        ));
        let unknown = service.sync_zone("ghost", ZONE, false).await;
        assert!(matches!(unknown, Err(CoreError::AccountNotFound(_))));
    }
}
