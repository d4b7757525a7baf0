//! Cloudflare `SourceProvider` trait 实现

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::traits::{ErrorContext, SourceProvider};
use crate::types::{
    PaginatedResponse, PaginationParams, ProviderType, SourceRecord, SourceZone, SrvFields,
    ZoneStatus,
};

use super::types::CloudflareSrvData;
use super::{
    AUTOMATIC_TTL_SECONDS, AUTOMATIC_TTL_SENTINEL, CloudflareDnsRecord, CloudflareProvider,
    CloudflareZone, MAX_PAGE_SIZE_RECORDS, MAX_PAGE_SIZE_ZONES,
};

impl CloudflareProvider {
    /// 将 Cloudflare zone 转换为 `SourceZone`
    /// Cloudflare 状态：active, pending, initializing, moved
    pub(crate) fn zone_to_source_zone(zone: CloudflareZone) -> SourceZone {
        let status = match zone.status.as_str() {
            "active" => ZoneStatus::Active,
            "pending" | "initializing" => ZoneStatus::Pending,
            "moved" => ZoneStatus::Paused,
            _ => ZoneStatus::Unknown,
        };

        SourceZone {
            id: zone.id,
            name: zone.name,
            provider: ProviderType::Cloudflare,
            status,
            record_count: None,
        }
    }

    /// 将 Cloudflare 记录转换为 `SourceRecord`
    ///
    /// SRV 的结构化字段来自 `data`；无法解析的 `data` 保持为空，由规范化阶段报告。
    /// "automatic" TTL 换算为实际生效的秒数。
    pub(crate) fn cf_record_to_source_record(cf_record: CloudflareDnsRecord) -> SourceRecord {
        let srv = if cf_record.record_type.eq_ignore_ascii_case("SRV") {
            cf_record
                .data
                .and_then(|data| serde_json::from_value::<CloudflareSrvData>(data).ok())
                .map(|d| SrvFields {
                    priority: d.priority,
                    weight: d.weight,
                    port: d.port,
                    target: d.target,
                })
        } else {
            None
        };

        let ttl = if cf_record.ttl == AUTOMATIC_TTL_SENTINEL {
            AUTOMATIC_TTL_SECONDS
        } else {
            cf_record.ttl
        };

        SourceRecord {
            id: cf_record.id,
            name: cf_record.name,
            record_type: cf_record.record_type,
            ttl,
            content: cf_record.content,
            priority: cf_record.priority,
            srv,
        }
    }
}

#[async_trait]
impl SourceProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn validate_credentials(&self) -> Result<bool> {
        #[derive(Deserialize)]
        struct VerifyResponse {
            status: String,
        }

        match self.get::<VerifyResponse>("/user/tokens/verify").await {
            Ok(resp) => Ok(resp.status == "active"),
            Err(e) => {
                log::warn!("[cloudflare] credential check failed: {e}");
                Ok(false)
            }
        }
    }

    async fn list_zones(&self, params: &PaginationParams) -> Result<PaginatedResponse<SourceZone>> {
        let params = params.validated(MAX_PAGE_SIZE_ZONES);
        let (zones, total_count): (Vec<CloudflareZone>, u32) = self
            .get_paginated("/zones", &params, ErrorContext::default())
            .await?;
        let zones = zones.into_iter().map(Self::zone_to_source_zone).collect();
        Ok(PaginatedResponse::new(
            zones,
            params.page,
            params.page_size,
            total_count,
        ))
    }

    async fn list_records(
        &self,
        zone_id: &str,
        params: &PaginationParams,
    ) -> Result<PaginatedResponse<SourceRecord>> {
        let params = params.validated(MAX_PAGE_SIZE_RECORDS);
        let context = ErrorContext {
            record_id: None,
            zone: Some(zone_id.to_string()),
        };
        let (records, total_count): (Vec<CloudflareDnsRecord>, u32) = self
            .get_paginated(&format!("/zones/{zone_id}/dns_records"), &params, context)
            .await?;
        let records = records
            .into_iter()
            .map(Self::cf_record_to_source_record)
            .collect();
        Ok(PaginatedResponse::new(
            records,
            params.page,
            params.page_size,
            total_count,
        ))
    }
}
