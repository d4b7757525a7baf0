//! 业务逻辑服务层

mod run_aggregator;
mod sync_service;

pub use run_aggregator::RunAggregator;
pub use sync_service::SyncService;

use std::sync::Arc;

use zonesync_provider::{ProviderError, SourceProvider, TargetStore};

use crate::error::{CoreError, CoreResult};
use crate::traits::{RunReporter, SnapshotWriter, SourceRegistry};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入数据源、目标存储和报告实现。
pub struct ServiceContext {
    /// 数据源注册表
    pub source_registry: Arc<dyn SourceRegistry>,
    /// 目标 DNS 服务器
    pub target_store: Arc<dyn TargetStore>,
    /// 快照存储（未配置时不写快照）
    pub snapshot_writer: Option<Arc<dyn SnapshotWriter>>,
    /// 运行报告
    pub run_reporter: Arc<dyn RunReporter>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        source_registry: Arc<dyn SourceRegistry>,
        target_store: Arc<dyn TargetStore>,
        snapshot_writer: Option<Arc<dyn SnapshotWriter>>,
        run_reporter: Arc<dyn RunReporter>,
    ) -> Self {
        Self {
            source_registry,
            target_store,
            snapshot_writer,
            run_reporter,
        }
    }

    /// 获取数据源实例
    pub async fn get_source(&self, account_id: &str) -> CoreResult<Arc<dyn SourceProvider>> {
        self.source_registry
            .get(account_id)
            .await
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))
    }

    /// 处理数据源错误，凭证失效时单独记录
    pub fn handle_provider_error(&self, account_id: &str, err: ProviderError) -> CoreError {
        if let ProviderError::InvalidCredentials { .. } = &err {
            log::warn!("Account {account_id}: credentials rejected by source");
        }
        CoreError::Provider(err)
    }
}
