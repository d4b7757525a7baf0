use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    CanonicalRecord, PaginatedResponse, PaginationParams, SourceRecord, SourceZone, TargetRecord,
};

/// Upper bound on pages walked by the `list_all_*` helpers.
const MAX_PAGES: u32 = 10_000;

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（各 Provider 格式不同）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    #[allow(dead_code)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录 ID（用于 `RecordNotFound`）
    pub record_id: Option<String>,
    /// Zone 名称或 ID（用于 `ZoneNotFound`）
    pub zone: Option<String>,
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// 权威数据源 Trait（云 DNS）
///
/// 只读：同步过程从不修改数据源。
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// 数据源标识符
    fn id(&self) -> &'static str;

    /// 验证凭证是否有效
    async fn validate_credentials(&self) -> Result<bool>;

    /// 获取 zone 列表 (分页)
    async fn list_zones(&self, params: &PaginationParams)
    -> Result<PaginatedResponse<SourceZone>>;

    /// 获取 zone 下的原始记录 (分页)
    async fn list_records(
        &self,
        zone_id: &str,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<SourceRecord>>;

    /// 获取全部 zone（逐页读取直到没有下一页）
    async fn list_all_zones(&self) -> Result<Vec<SourceZone>> {
        let mut params = PaginationParams::default();
        let mut zones = Vec::new();
        for _ in 0..MAX_PAGES {
            let page = self.list_zones(&params).await?;
            let has_more = page.has_more && !page.items.is_empty();
            zones.extend(page.items);
            if !has_more {
                return Ok(zones);
            }
            params = params.next();
        }
        log::warn!("[{}] zone listing stopped after {MAX_PAGES} pages", self.id());
        Ok(zones)
    }

    /// 获取 zone 下的全部原始记录
    async fn list_all_records(&self, zone_id: &str) -> Result<Vec<SourceRecord>> {
        let mut params = PaginationParams::default();
        let mut records = Vec::new();
        for _ in 0..MAX_PAGES {
            let page = self.list_records(zone_id, &params).await?;
            let has_more = page.has_more && !page.items.is_empty();
            records.extend(page.items);
            if !has_more {
                return Ok(records);
            }
            params = params.next();
        }
        // 截断的记录集会导致错误的删除，必须失败
        Err(ProviderError::InvalidParameter {
            provider: self.id().to_string(),
            param: "zone_id".to_string(),
            detail: format!("zone {zone_id} exceeds {MAX_PAGES} pages of records"),
        })
    }
}

/// 目标 DNS 服务器存储 Trait（secondary）
///
/// Zone 名称不带末尾的点；主机名相对于 zone，`@` 表示 apex。
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// 存储标识符（用于日志）
    fn id(&self) -> &'static str;

    /// 列出目标服务器上的全部 zone 名称
    async fn list_zones(&self) -> Result<Vec<String>>;

    /// 创建 zone（由服务器生成 SOA 与 apex NS）
    async fn create_zone(&self, zone: &str) -> Result<()>;

    /// 列出 zone 下全部原始记录（包含 SOA 与 apex NS）
    async fn list_records(&self, zone: &str) -> Result<Vec<TargetRecord>>;

    /// 列出与主机名相同的全部原始记录；`@` 返回 zone 根上的记录
    async fn list_records_by_host_name(
        &self,
        zone: &str,
        host_name: &str,
    ) -> Result<Vec<TargetRecord>>;

    /// 创建记录
    async fn create_record(&self, zone: &str, record: &CanonicalRecord) -> Result<()>;

    /// 删除一条原始记录
    async fn delete_record(&self, zone: &str, record: &TargetRecord) -> Result<()>;
}
