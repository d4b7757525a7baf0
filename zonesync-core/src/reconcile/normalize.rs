//! Raw source / target records → canonical records
//!
//! Both normalizers skip SOA records and the apex NS set, reject record types
//! outside the replicated set and are otherwise pure.

use std::net::Ipv4Addr;
use std::str::FromStr;

use zonesync_provider::{
    APEX_HOST, CanonicalRecord, RecordData, RecordType, SourceRecord, TargetRecord,
    full_name_to_relative, normalize_host_name, target_fields,
};

use crate::error::{CoreError, CoreResult};
use crate::types::RecordCollection;

const SOA: &str = "SOA";

/// Outcome of looking at a raw type tag
enum TypeTag {
    /// Managed by the DNS server itself, never replicated
    Excluded,
    Supported(RecordType),
}

fn classify(zone: &str, host_name: &str, raw_type: &str) -> CoreResult<TypeTag> {
    if raw_type.trim().eq_ignore_ascii_case(SOA) {
        return Ok(TypeTag::Excluded);
    }
    match RecordType::parse(raw_type) {
        Some(RecordType::Ns) if host_name == APEX_HOST => Ok(TypeTag::Excluded),
        Some(record_type) => Ok(TypeTag::Supported(record_type)),
        None => Err(CoreError::UnsupportedRecordType {
            zone: zone.to_string(),
            record_type: raw_type.trim().to_ascii_uppercase(),
        }),
    }
}

fn malformed(zone: &str, host_name: &str, detail: impl Into<String>) -> CoreError {
    CoreError::MalformedRecord {
        zone: zone.to_string(),
        host_name: host_name.to_string(),
        detail: detail.into(),
    }
}

fn ipv4(zone: &str, host_name: &str, value: &str) -> CoreResult<String> {
    Ipv4Addr::from_str(value.trim())
        .map(|addr| addr.to_string())
        .map_err(|_| malformed(zone, host_name, format!("invalid IPv4 address {value:?}")))
}

fn non_empty(zone: &str, host_name: &str, field: &str, value: &str) -> CoreResult<String> {
    if value.trim().is_empty() {
        Err(malformed(zone, host_name, format!("empty {field}")))
    } else {
        Ok(value.to_string())
    }
}

// ============ Cloud source ============

/// Normalize every raw record of a source zone.
pub fn normalize_source(zone: &str, raw: &[SourceRecord]) -> CoreResult<RecordCollection> {
    let mut records = Vec::with_capacity(raw.len());
    for record in raw {
        if let Some(canonical) = normalize_source_record(zone, record)? {
            records.push(canonical);
        }
    }
    Ok(RecordCollection::new(records))
}

/// Normalize one raw source record; `Ok(None)` for excluded records.
pub fn normalize_source_record(
    zone: &str,
    record: &SourceRecord,
) -> CoreResult<Option<CanonicalRecord>> {
    let host_name = normalize_host_name(&full_name_to_relative(&record.name, zone));
    let TypeTag::Supported(record_type) = classify(zone, &host_name, &record.record_type)? else {
        return Ok(None);
    };

    let content = record.content.as_str();
    let data = match record_type {
        RecordType::A => RecordData::A {
            ipv4_address: ipv4(zone, &host_name, content)?,
        },
        RecordType::Cname => RecordData::CNAME {
            alias: non_empty(zone, &host_name, "alias", content)?,
        },
        RecordType::Mx => RecordData::MX {
            exchange: non_empty(zone, &host_name, "exchange", content)?,
            preference: record
                .priority
                .ok_or_else(|| malformed(zone, &host_name, "MX record without preference"))?,
        },
        RecordType::Ns => RecordData::NS {
            name_server: non_empty(zone, &host_name, "name server", content)?,
        },
        RecordType::Ptr => RecordData::PTR {
            target: non_empty(zone, &host_name, "target", content)?,
        },
        RecordType::Srv => source_srv(zone, &host_name, record)?,
        RecordType::Txt => RecordData::TXT {
            text: content.to_string(),
        },
    };

    Ok(Some(CanonicalRecord::new(host_name, record.ttl, data)))
}

/// SRV fields come from the structured data when present, otherwise from the
/// presentation form `[priority] weight port target` of the content.
fn source_srv(zone: &str, host_name: &str, record: &SourceRecord) -> CoreResult<RecordData> {
    if let Some(srv) = &record.srv {
        return Ok(RecordData::SRV {
            target: non_empty(zone, host_name, "target", &srv.target)?,
            port: srv.port,
            priority: srv.priority,
            weight: srv.weight,
        });
    }

    let parts: Vec<&str> = record.content.split_whitespace().collect();
    let (priority, rest) = match (parts.len(), record.priority) {
        (4, _) => (parts[0], &parts[1..]),
        (3, Some(_)) => ("", &parts[..]),
        _ => {
            return Err(malformed(
                zone,
                host_name,
                format!("unreadable SRV content {:?}", record.content),
            ));
        }
    };
    let number = |field: &str, value: &str| {
        value
            .parse::<u16>()
            .map_err(|_| malformed(zone, host_name, format!("invalid SRV {field} {value:?}")))
    };

    Ok(RecordData::SRV {
        target: non_empty(zone, host_name, "target", rest[2])?,
        port: number("port", rest[1])?,
        priority: match record.priority {
            Some(p) if priority.is_empty() => p,
            _ => number("priority", priority)?,
        },
        weight: number("weight", rest[0])?,
    })
}

// ============ Target store ============

/// Normalize every raw record of a target zone.
pub fn normalize_target(zone: &str, raw: &[TargetRecord]) -> CoreResult<RecordCollection> {
    let mut records = Vec::with_capacity(raw.len());
    for record in raw {
        if let Some(canonical) = normalize_target_record(zone, record)? {
            records.push(canonical);
        }
    }
    Ok(RecordCollection::new(records))
}

/// Normalize one property-bag record; `Ok(None)` for excluded records.
pub fn normalize_target_record(
    zone: &str,
    record: &TargetRecord,
) -> CoreResult<Option<CanonicalRecord>> {
    use target_fields as f;

    let host_name = normalize_host_name(&record.host_name);
    let TypeTag::Supported(record_type) = classify(zone, &host_name, &record.record_type)? else {
        return Ok(None);
    };

    let field = |key: &str| {
        record
            .field(key)
            .ok_or_else(|| malformed(zone, &host_name, format!("missing field {key}")))
    };
    let number = |key: &str| {
        let value = field(key)?;
        value
            .trim()
            .parse::<u16>()
            .map_err(|_| malformed(zone, &host_name, format!("invalid {key} {value:?}")))
    };

    let data = match record_type {
        RecordType::A => RecordData::A {
            ipv4_address: ipv4(zone, &host_name, field(f::IPV4_ADDRESS)?)?,
        },
        RecordType::Cname => RecordData::CNAME {
            alias: non_empty(zone, &host_name, "alias", field(f::HOST_NAME_ALIAS)?)?,
        },
        RecordType::Mx => RecordData::MX {
            exchange: non_empty(zone, &host_name, "exchange", field(f::MAIL_EXCHANGE)?)?,
            preference: number(f::PREFERENCE)?,
        },
        RecordType::Ns => RecordData::NS {
            name_server: non_empty(zone, &host_name, "name server", field(f::NAME_SERVER)?)?,
        },
        RecordType::Ptr => RecordData::PTR {
            target: non_empty(zone, &host_name, "target", field(f::PTR_DOMAIN_NAME)?)?,
        },
        RecordType::Srv => RecordData::SRV {
            target: non_empty(zone, &host_name, "target", field(f::DOMAIN_NAME)?)?,
            port: number(f::PORT)?,
            priority: number(f::PRIORITY)?,
            weight: number(f::WEIGHT)?,
        },
        RecordType::Txt => RecordData::TXT {
            text: field(f::DESCRIPTIVE_TEXT)?.to_string(),
        },
    };

    Ok(Some(CanonicalRecord::new(host_name, record.ttl, data)))
}
