//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use zonesync_provider::{
    CanonicalRecord, ProviderCredentials, RecordData, RetryPolicy, SourceProvider, create_source,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 测试用 A 记录
pub fn a_record(host: &str, ip: &str) -> CanonicalRecord {
    CanonicalRecord::new(
        host,
        300,
        RecordData::A {
            ipv4_address: ip.to_string(),
        },
    )
}

/// 测试上下文 - 封装数据源和测试 zone
pub struct TestContext {
    pub source: Arc<dyn SourceProvider>,
    pub zone: String,
}

impl TestContext {
    /// 创建 Cloudflare 测试上下文
    pub fn cloudflare() -> Option<Self> {
        let api_token = env::var("CLOUDFLARE_API_TOKEN").ok()?;
        let zone = env::var("TEST_ZONE").ok()?;

        let credentials = ProviderCredentials::Cloudflare { api_token };
        let source = create_source(credentials, RetryPolicy::default()).ok()?;

        Some(Self { source, zone })
    }

    /// 查找测试 zone 的 id
    pub async fn find_zone_id(&self) -> Option<String> {
        let zones = self.source.list_all_zones().await.ok()?;
        zones
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(&self.zone))
            .map(|z| z.id)
    }
}
