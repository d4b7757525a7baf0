//! Collision guard: refuses target zones whose host names repeat the zone name
//!
//! A host such as `sub.example.com` in zone `example.com` resolves to
//! `sub.example.com.example.com`. Host-name queries against the target store return
//! ambiguous results for such zones, so they must never be diffed or mutated.

use zonesync_provider::{APEX_HOST, normalize_zone_name};

use crate::error::{CoreError, CoreResult};
use crate::types::RecordCollection;

/// Whether `host_name` already ends with `zone` as a trailing label sequence.
pub fn repeats_zone_name(host_name: &str, zone: &str) -> bool {
    let host = normalize_zone_name(host_name);
    let zone = normalize_zone_name(zone);
    if host == APEX_HOST || zone.is_empty() {
        return false;
    }
    host == zone || host.ends_with(&format!(".{zone}"))
}

/// Fail with [`CoreError::SubdomainCollision`] on the first colliding host name.
pub fn check_safe(target: &RecordCollection, zone: &str) -> CoreResult<()> {
    match target
        .iter()
        .find(|record| repeats_zone_name(record.host_name(), zone))
    {
        Some(record) => {
            log::warn!(
                "[{zone}] host {} repeats the zone name, refusing to reconcile",
                record.host_name()
            );
            Err(CoreError::SubdomainCollision {
                zone: zone.to_string(),
                host_name: record.host_name().to_string(),
            })
        }
        None => Ok(()),
    }
}
