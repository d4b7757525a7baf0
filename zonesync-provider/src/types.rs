use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The host name token that denotes the zone apex.
pub const APEX_HOST: &str = "@";

// ============ Pagination ============

/// Pagination parameters for list operations.
///
/// Pages are 1-indexed. The default is `page = 1, page_size = 100`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 100,
        }
    }
}

impl PaginationParams {
    /// Clamp pagination values to valid ranges.
    ///
    /// - `page` is clamped to `>= 1`
    /// - `page_size` is clamped to `1..=max_page_size`
    #[must_use]
    pub fn validated(&self, max_page_size: u32) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max_page_size),
        }
    }

    /// Parameters for the page after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

/// A paginated response wrapper.
///
/// Returned by all source list operations. Contains the current page of items
/// along with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items in the current page.
    pub items: Vec<T>,
    /// Current page number.
    pub page: u32,
    /// Page size used for this request.
    pub page_size: u32,
    /// Total number of items across all pages.
    pub total_count: u32,
    /// Whether there are more pages after this one.
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Create a new paginated response, automatically computing [`has_more`](Self::has_more).
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_count: u32) -> Self {
        let has_more = page.saturating_mul(page_size) < total_count;
        Self {
            items,
            page,
            page_size,
            total_count,
            has_more,
        }
    }
}

// ============ Provider Types ============

/// Identifies which cloud source implementation to use.
///
/// Each variant is gated behind its corresponding feature flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Cloudflare DNS. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    Cloudflare,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

/// Credentials for a cloud source account.
///
/// Serialized as a tagged enum with `"provider"` as the tag and `"credentials"` as the content:
///
/// ```json
/// { "provider": "cloudflare", "credentials": { "apiToken": "..." } }
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// Cloudflare credentials. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// Cloudflare API token (needs `Zone:Read` and `DNS:Read`).
        #[serde(rename = "apiToken")]
        api_token: String,
    },
}

impl ProviderCredentials {
    /// Returns the [`ProviderType`] these credentials belong to.
    pub fn provider_type(&self) -> ProviderType {
        match self {
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare { .. } => ProviderType::Cloudflare,
        }
    }
}

// 凭证不能出现在日志中
impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare { .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<redacted>")
                .finish(),
        }
    }
}

// ============ Zone Types ============

/// Status of a zone within a cloud source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// Zone is active and resolving.
    Active,
    /// Zone is paused (not resolving).
    Paused,
    /// Zone is pending activation/verification.
    Pending,
    /// Status could not be determined.
    Unknown,
}

/// A zone as reported by a cloud source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceZone {
    /// Source-specific zone identifier.
    pub id: String,
    /// Zone name without trailing dot (e.g., `"example.com"`).
    pub name: String,
    /// Which source serves this zone.
    pub provider: ProviderType,
    /// Current zone status.
    pub status: ZoneStatus,
    /// Number of records in this zone, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u32>,
}

// ============ Canonical Record Model ============

/// The fixed set of record types that can be replicated.
///
/// Serialized as uppercase strings (`"A"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Name server record.
    Ns,
    /// Pointer record.
    Ptr,
    /// Service locator record.
    Srv,
    /// Text record.
    Txt,
}

impl RecordType {
    /// All supported record types.
    pub const ALL: [Self; 7] = [
        Self::A,
        Self::Cname,
        Self::Mx,
        Self::Ns,
        Self::Ptr,
        Self::Srv,
        Self::Txt,
    ];

    /// Uppercase wire name of the type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        }
    }

    /// Parse a type tag, case-insensitively. Returns `None` for anything
    /// outside the supported set (including `SOA`).
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag.trim()))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-safe representation of record data, one variant per [`RecordType`].
///
/// Name-valued fields are fully qualified and end with a trailing dot once the
/// owning [`CanonicalRecord`] has been built through [`CanonicalRecord::new`].
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum RecordData {
    /// A record: maps a host name to an IPv4 address.
    A {
        /// IPv4 address (e.g., `"192.0.2.1"`).
        #[serde(rename = "ipv4Address")]
        ipv4_address: String,
    },

    /// CNAME record: alias from one name to another.
    CNAME {
        /// Aliased FQDN.
        alias: String,
    },

    /// MX record: mail exchange server.
    MX {
        /// Mail server FQDN.
        exchange: String,
        /// Preference (lower = preferred).
        preference: u16,
    },

    /// NS record: delegation to a name server.
    NS {
        /// Name server FQDN.
        #[serde(rename = "nameServer")]
        name_server: String,
    },

    /// PTR record: reverse pointer.
    PTR {
        /// Pointed-to FQDN.
        target: String,
    },

    /// SRV record: service locator.
    SRV {
        /// Target FQDN providing the service.
        target: String,
        /// TCP/UDP port number.
        port: u16,
        /// Priority (lower = preferred).
        priority: u16,
        /// Weight for load balancing among same-priority targets.
        weight: u16,
    },

    /// TXT record: arbitrary text data.
    TXT {
        /// Text content.
        text: String,
    },
}

impl RecordData {
    /// Returns the [`RecordType`] discriminant for this record data.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A { .. } => RecordType::A,
            Self::CNAME { .. } => RecordType::Cname,
            Self::MX { .. } => RecordType::Mx,
            Self::NS { .. } => RecordType::Ns,
            Self::PTR { .. } => RecordType::Ptr,
            Self::SRV { .. } => RecordType::Srv,
            Self::TXT { .. } => RecordType::Txt,
        }
    }

    /// Returns the primary display value (the address, the target name, the text).
    pub fn display_value(&self) -> &str {
        match self {
            Self::A { ipv4_address } => ipv4_address,
            Self::CNAME { alias } => alias,
            Self::MX { exchange, .. } => exchange,
            Self::NS { name_server } => name_server,
            Self::PTR { target } | Self::SRV { target, .. } => target,
            Self::TXT { text } => text,
        }
    }

    /// Field name/value pairs, sorted by field name.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::A { ipv4_address } => vec![("ipv4Address", ipv4_address.clone())],
            Self::CNAME { alias } => vec![("alias", alias.clone())],
            Self::MX {
                exchange,
                preference,
            } => vec![
                ("exchange", exchange.clone()),
                ("preference", preference.to_string()),
            ],
            Self::NS { name_server } => vec![("nameServer", name_server.clone())],
            Self::PTR { target } => vec![("target", target.clone())],
            Self::SRV {
                target,
                port,
                priority,
                weight,
            } => vec![
                ("port", port.to_string()),
                ("priority", priority.to_string()),
                ("target", target.clone()),
                ("weight", weight.to_string()),
            ],
            Self::TXT { text } => vec![("text", text.clone())],
        }
    }

    /// Applies canonical spelling: trimmed values, lower-case FQDNs with a trailing dot.
    fn canonicalized(self) -> Self {
        match self {
            Self::A { ipv4_address } => Self::A {
                ipv4_address: ipv4_address.trim().to_string(),
            },
            Self::CNAME { alias } => Self::CNAME {
                alias: normalize_fqdn(&alias),
            },
            Self::MX {
                exchange,
                preference,
            } => Self::MX {
                exchange: normalize_fqdn(&exchange),
                preference,
            },
            Self::NS { name_server } => Self::NS {
                name_server: normalize_fqdn(&name_server),
            },
            Self::PTR { target } => Self::PTR {
                target: normalize_fqdn(&target),
            },
            Self::SRV {
                target,
                port,
                priority,
                weight,
            } => Self::SRV {
                target: normalize_fqdn(&target),
                port,
                priority,
                weight,
            },
            txt @ Self::TXT { .. } => txt,
        }
    }
}

/// Normalize a domain name: trimmed, lower-case, always ending with `.`.
///
/// `"Mail.Example.com"` and `"mail.example.com."` both become `"mail.example.com."`;
/// an empty name becomes the root `"."`.
pub fn normalize_fqdn(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.').to_ascii_lowercase();
    format!("{trimmed}.")
}

/// Normalize a zone-relative host name; empty names and the apex token map to `@`.
pub fn normalize_host_name(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('.');
    if trimmed.is_empty() || trimmed == APEX_HOST {
        APEX_HOST.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Deterministic identity of a [`CanonicalRecord`].
///
/// Serialization of host name, record type, TTL and every data field (sorted by
/// field name). Two records are the same record iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_key_part(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '|' | ';' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The unit of comparison and mutation.
///
/// The record type is derived from [`RecordData`], so type and data can never
/// disagree. Equality and hashing follow [`identity_key`](Self::identity_key):
/// a record whose TTL changed is a different record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CanonicalRecordFields")]
pub struct CanonicalRecord {
    host_name: String,
    ttl: u32,
    data: RecordData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalRecordFields {
    host_name: String,
    ttl: u32,
    data: RecordData,
}

impl From<CanonicalRecordFields> for CanonicalRecord {
    fn from(fields: CanonicalRecordFields) -> Self {
        Self::new(fields.host_name, fields.ttl, fields.data)
    }
}

impl CanonicalRecord {
    /// Build a record, normalizing the host name and every name-valued field.
    pub fn new(host_name: impl AsRef<str>, ttl: u32, data: RecordData) -> Self {
        Self {
            host_name: normalize_host_name(host_name.as_ref()),
            ttl,
            data: data.canonicalized(),
        }
    }

    /// Host name relative to the zone (`@` for the apex).
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Time to live in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Whether this record sits at the zone apex.
    pub fn is_apex(&self) -> bool {
        self.host_name == APEX_HOST
    }

    /// `host|TYPE|ttl|field=value;field=value`, with separators escaped in values.
    pub fn identity_key(&self) -> IdentityKey {
        let fields = self
            .data
            .fields()
            .into_iter()
            .map(|(name, value)| format!("{name}={}", escape_key_part(&value)))
            .collect::<Vec<_>>()
            .join(";");
        IdentityKey(format!(
            "{}|{}|{}|{fields}",
            escape_key_part(&self.host_name),
            self.record_type(),
            self.ttl
        ))
    }
}

impl PartialEq for CanonicalRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for CanonicalRecord {}

impl std::hash::Hash for CanonicalRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

impl fmt::Display for CanonicalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} TTL={} {}",
            self.record_type(),
            self.host_name,
            self.ttl,
            self.data.display_value()
        )
    }
}

// ============ Raw Records ============

/// Structured SRV fields as reported by a cloud source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvFields {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// A record as returned by a cloud source, before normalization.
///
/// Names use the source's own conventions (FQDN with or without trailing dot);
/// the type is the source's raw tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    /// Source-specific record identifier.
    pub id: String,
    /// Fully qualified owner name (e.g., `"www.example.com"`).
    pub name: String,
    /// Raw type tag (e.g., `"A"`, `"SOA"`).
    pub record_type: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Primary value (address, target, text).
    pub content: String,
    /// MX preference / SRV priority, when the source reports it separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// Structured SRV data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srv: Option<SrvFields>,
}

/// Property-bag keys used by [`TargetRecord::data`].
pub mod target_fields {
    pub const IPV4_ADDRESS: &str = "ipv4Address";
    pub const HOST_NAME_ALIAS: &str = "hostNameAlias";
    pub const MAIL_EXCHANGE: &str = "mailExchange";
    pub const PREFERENCE: &str = "preference";
    pub const NAME_SERVER: &str = "nameServer";
    pub const PTR_DOMAIN_NAME: &str = "ptrDomainName";
    pub const DOMAIN_NAME: &str = "domainName";
    pub const PORT: &str = "port";
    pub const PRIORITY: &str = "priority";
    pub const WEIGHT: &str = "weight";
    pub const DESCRIPTIVE_TEXT: &str = "descriptiveText";
    pub const PRIMARY_SERVER: &str = "primaryServer";
    pub const RESPONSIBLE_PERSON: &str = "responsiblePerson";
    pub const SERIAL_NUMBER: &str = "serialNumber";
}

/// A record as held by the target store, before normalization.
///
/// Type-specific values live in a free-form property bag keyed by
/// [`target_fields`] constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRecord {
    /// Store-specific record identifier.
    pub id: String,
    /// Host name relative to the zone (`@` for the apex).
    pub host_name: String,
    /// Raw type tag (e.g., `"A"`, `"SOA"`).
    pub record_type: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Type-specific values.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl TargetRecord {
    /// Convert a canonical record into the store's property-bag shape.
    pub fn from_canonical(id: impl Into<String>, record: &CanonicalRecord) -> Self {
        use target_fields as f;

        let mut data = BTreeMap::new();
        match record.data() {
            RecordData::A { ipv4_address } => {
                data.insert(f::IPV4_ADDRESS.to_string(), ipv4_address.clone());
            }
            RecordData::CNAME { alias } => {
                data.insert(f::HOST_NAME_ALIAS.to_string(), alias.clone());
            }
            RecordData::MX {
                exchange,
                preference,
            } => {
                data.insert(f::MAIL_EXCHANGE.to_string(), exchange.clone());
                data.insert(f::PREFERENCE.to_string(), preference.to_string());
            }
            RecordData::NS { name_server } => {
                data.insert(f::NAME_SERVER.to_string(), name_server.clone());
            }
            RecordData::PTR { target } => {
                data.insert(f::PTR_DOMAIN_NAME.to_string(), target.clone());
            }
            RecordData::SRV {
                target,
                port,
                priority,
                weight,
            } => {
                data.insert(f::DOMAIN_NAME.to_string(), target.clone());
                data.insert(f::PORT.to_string(), port.to_string());
                data.insert(f::PRIORITY.to_string(), priority.to_string());
                data.insert(f::WEIGHT.to_string(), weight.to_string());
            }
            RecordData::TXT { text } => {
                data.insert(f::DESCRIPTIVE_TEXT.to_string(), text.clone());
            }
        }

        Self {
            id: id.into(),
            host_name: record.host_name().to_string(),
            record_type: record.record_type().as_str().to_string(),
            ttl: record.ttl(),
            data,
        }
    }

    /// Look up a property-bag value.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}
