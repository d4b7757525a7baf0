//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use zonesync_provider::ProviderError;
use zonesync_provider::CanonicalRecord;

/// Core layer error type
///
/// Every reconciliation error is fatal for the zone it names; the sync service
/// records it and moves on to the next zone.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// A raw record's type is outside the replicated set
    #[error("Unsupported record type {record_type} in zone {zone}")]
    UnsupportedRecordType { zone: String, record_type: String },

    /// A raw record is missing a field or carries an unparsable value
    #[error("Malformed record {host_name} in zone {zone}: {detail}")]
    MalformedRecord {
        zone: String,
        host_name: String,
        detail: String,
    },

    /// The target zone holds a host name that already ends with the zone name
    #[error("Subdomain collision in zone {zone}: host {host_name} repeats the zone name")]
    SubdomainCollision { zone: String, host_name: String },

    /// No target record matched a record scheduled for removal
    #[error("Record not found for removal in zone {zone}: {host_name}")]
    RecordNotFoundForRemoval { zone: String, host_name: String },

    /// A create or delete against the target store failed
    #[error("Failed to apply {record} in zone {zone}: {cause}")]
    Apply {
        zone: String,
        record: CanonicalRecord,
        #[source]
        cause: ProviderError,
    },

    /// The same zone name is served by more than one source account
    #[error("Zone {zone} is served by multiple accounts: {}", accounts.join(", "))]
    ZoneConflict { zone: String, accounts: Vec<String> },

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Snapshot storage error
    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (bad source data, configuration, unknown account),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::UnsupportedRecordType { .. }
            | Self::MalformedRecord { .. }
            | Self::SubdomainCollision { .. }
            | Self::ZoneConflict { .. }
            | Self::AccountNotFound(_)
            | Self::ValidationError(_) => true,
            Self::Provider(e) => e.is_expected(),
            Self::RecordNotFoundForRemoval { .. } | Self::Apply { .. } | Self::SnapshotError(_) => {
                false
            }
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use zonesync_provider::RecordData;

    #[test]
    fn apply_error_keeps_cause_and_record() {
        let err = CoreError::Apply {
            zone: "example.com".to_string(),
            record: CanonicalRecord::new(
                "www",
                300,
                RecordData::A {
                    ipv4_address: "192.0.2.1".to_string(),
                },
            ),
            cause: ProviderError::Timeout {
                provider: "memory".to_string(),
                detail: "slow".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("A www TTL=300 192.0.2.1"), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_expected());
    }

    #[test]
    fn conflict_lists_accounts() {
        let err = CoreError::ZoneConflict {
            zone: "example.com".to_string(),
            accounts: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Zone example.com is served by multiple accounts: a, b"
        );
        assert!(err.is_expected());
    }

    #[test]
    fn serializes_with_code_tag() {
        let err = CoreError::SubdomainCollision {
            zone: "example.com".to_string(),
            host_name: "sub.example.com".to_string(),
        };
        let res = serde_json::to_value(&err);
        assert!(res.is_ok(), "serde_json::to_value failed: {res:?}");
        let Ok(json) = res else {
            return;
        };
        assert_eq!(json["code"], "SubdomainCollision");
        assert_eq!(json["details"]["zone"], "example.com");
    }

    #[test]
    fn provider_errors_pass_through() {
        let err: CoreError = ProviderError::InvalidCredentials {
            provider: "cloudflare".to_string(),
            raw_message: None,
        }
        .into();
        assert!(matches!(err, CoreError::Provider(_)));
        assert!(err.is_expected());
    }
}
