//! In-memory target store
//!
//! Behaves like a secondary DNS server: creating a zone seeds an SOA record and an
//! apex NS record, record ids are generated by the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_zone_name;
use crate::traits::TargetStore;
use crate::types::{APEX_HOST, CanonicalRecord, TargetRecord, normalize_host_name, target_fields};

const STORE_ID: &str = "memory";
const DEFAULT_SOA_TTL: u32 = 3600;

/// Target store held entirely in memory.
#[derive(Clone)]
pub struct InMemoryTargetStore {
    zones: Arc<RwLock<BTreeMap<String, Vec<TargetRecord>>>>,
    name_server: Option<String>,
}

impl Default for InMemoryTargetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self {
            zones: Arc::new(RwLock::new(BTreeMap::new())),
            name_server: None,
        }
    }

    /// 指定新 zone 的主 NS（默认 `ns1.<zone>.`）
    #[must_use]
    pub fn with_name_server(mut self, name_server: impl Into<String>) -> Self {
        self.name_server = Some(name_server.into());
        self
    }

    /// 直接写入一条原始记录，不做任何校验（zone 不存在时自动创建空 zone）
    pub async fn insert_raw(&self, zone: &str, record: TargetRecord) {
        self.zones
            .write()
            .await
            .entry(normalize_zone_name(zone))
            .or_default()
            .push(record);
    }

    fn zone_not_found(zone: &str) -> ProviderError {
        ProviderError::ZoneNotFound {
            provider: STORE_ID.to_string(),
            zone: zone.to_string(),
            raw_message: None,
        }
    }
}

/// SOA 与 apex NS：目标服务器创建 zone 时自带的记录
///
/// `name_server` defaults to `ns1.<zone>.`.
pub fn seed_zone_records(zone: &str, name_server: Option<&str>) -> Vec<TargetRecord> {
    let name_server = name_server.map_or_else(|| format!("ns1.{zone}."), str::to_string);

    let soa = TargetRecord {
        id: uuid::Uuid::new_v4().to_string(),
        host_name: APEX_HOST.to_string(),
        record_type: "SOA".to_string(),
        ttl: DEFAULT_SOA_TTL,
        data: BTreeMap::from([
            (target_fields::PRIMARY_SERVER.to_string(), name_server.clone()),
            (
                target_fields::RESPONSIBLE_PERSON.to_string(),
                format!("hostmaster.{zone}."),
            ),
            (target_fields::SERIAL_NUMBER.to_string(), "1".to_string()),
        ]),
    };
    let ns = TargetRecord {
        id: uuid::Uuid::new_v4().to_string(),
        host_name: APEX_HOST.to_string(),
        record_type: "NS".to_string(),
        ttl: DEFAULT_SOA_TTL,
        data: BTreeMap::from([(target_fields::NAME_SERVER.to_string(), name_server)]),
    };
    vec![soa, ns]
}

#[async_trait]
impl TargetStore for InMemoryTargetStore {
    fn id(&self) -> &'static str {
        STORE_ID
    }

    async fn list_zones(&self) -> Result<Vec<String>> {
        Ok(self.zones.read().await.keys().cloned().collect())
    }

    async fn create_zone(&self, zone: &str) -> Result<()> {
        let zone = normalize_zone_name(zone);
        let mut zones = self.zones.write().await;
        if zones.contains_key(&zone) {
            return Err(ProviderError::ZoneExists {
                provider: STORE_ID.to_string(),
                zone,
            });
        }
        let seeded = seed_zone_records(&zone, self.name_server.as_deref());
        zones.insert(zone, seeded);
        Ok(())
    }

    async fn list_records(&self, zone: &str) -> Result<Vec<TargetRecord>> {
        let zone = normalize_zone_name(zone);
        self.zones
            .read()
            .await
            .get(&zone)
            .cloned()
            .ok_or_else(|| Self::zone_not_found(&zone))
    }

    async fn list_records_by_host_name(
        &self,
        zone: &str,
        host_name: &str,
    ) -> Result<Vec<TargetRecord>> {
        let host = normalize_host_name(host_name);
        let records = self.list_records(zone).await?;
        Ok(records
            .into_iter()
            .filter(|r| normalize_host_name(&r.host_name) == host)
            .collect())
    }

    async fn create_record(&self, zone: &str, record: &CanonicalRecord) -> Result<()> {
        let zone = normalize_zone_name(zone);
        let mut zones = self.zones.write().await;
        let records = zones
            .get_mut(&zone)
            .ok_or_else(|| Self::zone_not_found(&zone))?;
        records.push(TargetRecord::from_canonical(
            uuid::Uuid::new_v4().to_string(),
            record,
        ));
        Ok(())
    }

    async fn delete_record(&self, zone: &str, record: &TargetRecord) -> Result<()> {
        let zone = normalize_zone_name(zone);
        let mut zones = self.zones.write().await;
        let records = zones
            .get_mut(&zone)
            .ok_or_else(|| Self::zone_not_found(&zone))?;
        let Some(pos) = records.iter().position(|r| r.id == record.id) else {
            return Err(ProviderError::RecordNotFound {
                provider: STORE_ID.to_string(),
                record_id: record.id.clone(),
                raw_message: None,
            });
        };
        records.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordData;

    fn www_a() -> CanonicalRecord {
        CanonicalRecord::new(
            "www",
            300,
            RecordData::A {
                ipv4_address: "192.0.2.1".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn create_zone_seeds_soa_and_ns() {
        let store = InMemoryTargetStore::new();
        assert!(store.create_zone("Example.com.").await.is_ok());

        let res = store.list_records("example.com").await;
        assert!(res.is_ok(), "list_records failed: {res:?}");
        let Ok(records) = res else {
            return;
        };
        let types: Vec<&str> = records.iter().map(|r| r.record_type.as_str()).collect();
        assert_eq!(types, vec!["SOA", "NS"]);
        assert!(records.iter().all(|r| r.host_name == APEX_HOST));
    }

    #[tokio::test]
    async fn create_zone_twice_fails() {
        let store = InMemoryTargetStore::new();
        assert!(store.create_zone("example.com").await.is_ok());
        let res = store.create_zone("example.com").await;
        assert!(matches!(res, Err(ProviderError::ZoneExists { .. })));
    }

    #[tokio::test]
    async fn unknown_zone_is_not_found() {
        let store = InMemoryTargetStore::new();
        let res = store.list_records("missing.com").await;
        assert!(matches!(res, Err(ProviderError::ZoneNotFound { .. })));
    }

    #[tokio::test]
    async fn create_list_delete_record() {
        let store = InMemoryTargetStore::new();
        assert!(store.create_zone("example.com").await.is_ok());
        assert!(store.create_record("example.com", &www_a()).await.is_ok());

        let res = store.list_records_by_host_name("example.com", "WWW").await;
        assert!(res.is_ok(), "list_records_by_host_name failed: {res:?}");
        let Ok(found) = res else {
            return;
        };
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].field(target_fields::IPV4_ADDRESS),
            Some("192.0.2.1")
        );

        assert!(store.delete_record("example.com", &found[0]).await.is_ok());
        let again = store.delete_record("example.com", &found[0]).await;
        assert!(matches!(again, Err(ProviderError::RecordNotFound { .. })));
    }

    #[tokio::test]
    async fn apex_lookup_returns_seeded_records() {
        let store = InMemoryTargetStore::new().with_name_server("ns.secondary.net.");
        assert!(store.create_zone("example.com").await.is_ok());
        let res = store.list_records_by_host_name("example.com", "@").await;
        assert!(res.is_ok(), "apex lookup failed: {res:?}");
        let Ok(apex) = res else {
            return;
        };
        assert_eq!(apex.len(), 2);
        assert!(
            apex.iter()
                .any(|r| r.field(target_fields::NAME_SERVER) == Some("ns.secondary.net."))
        );
    }
}
