//! Cloudflare HTTP 请求方法

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::PaginationParams;

use super::{CF_API_BASE, CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// 执行 GET 请求并解析 Cloudflare 响应信封
    async fn get_envelope<T: DeserializeOwned>(
        &self,
        url: &str,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let request = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_token));

        let (_status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "GET",
            url,
            &self.retry,
        )
        .await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&response_text, self.provider_name())?;

        if !cf_response.success {
            let (code, message) = cf_response
                .errors
                .and_then(|errors| {
                    errors
                        .into_iter()
                        .next()
                        .map(|e| (e.code.to_string(), e.message))
                })
                .unwrap_or_else(|| (String::new(), "Unknown error".to_string()));
            log::error!("[cloudflare] API error: {message}");
            return Err(self.map_error(RawApiError::with_code(code, message), context));
        }

        Ok(cf_response)
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        self.get_envelope::<T>(&url, ErrorContext::default())
            .await?
            .result
            .ok_or_else(|| self.parse_error("missing `result` in response"))
    }

    /// 执行 GET 请求 (带分页)，返回 (条目, 总数)
    ///
    /// `params` 需要预先按接口的单页上限校验。
    pub(crate) async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &PaginationParams,
        context: ErrorContext,
    ) -> Result<(Vec<T>, u32)> {
        let url = format!(
            "{CF_API_BASE}{path}?page={}&per_page={}",
            params.page, params.page_size
        );

        let cf_response = self.get_envelope::<Vec<T>>(&url, context).await?;
        let total_count = cf_response.result_info.map_or(0, |i| i.total_count);
        let items = cf_response.result.unwrap_or_default();

        Ok((items, total_count))
    }
}
