//! Cloudflare DNS source

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::http_client::RetryPolicy;
use crate::providers::common::create_http_client;

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Cloudflare Zones API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_ZONES: u32 = 50;
/// Cloudflare DNS Records API 单页最大记录数
pub(crate) const MAX_PAGE_SIZE_RECORDS: u32 = 5000;
/// Cloudflare 用 TTL=1 表示 "automatic"
pub(crate) const AUTOMATIC_TTL_SENTINEL: u32 = 1;
/// "automatic" 对应的实际 TTL（秒）
pub(crate) const AUTOMATIC_TTL_SECONDS: u32 = 300;

/// Cloudflare DNS source (read-only)
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) api_token: String,
    pub(crate) retry: RetryPolicy,
}

impl CloudflareProvider {
    pub fn new(api_token: String, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: create_http_client("cloudflare")?,
            api_token,
            retry,
        })
    }
}
