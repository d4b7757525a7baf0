//! # zonesync-provider
//!
//! Source and target adapters for one-way DNS zone replication, together with the
//! canonical record model both sides are reduced to.
//!
//! ## Sources
//!
//! | Source | Feature Flag | Auth Method |
//! |--------|-------------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | `cloudflare` *(default)* | Bearer Token |
//!
//! Sources are read-only: the [`SourceProvider`] trait exposes listing operations only.
//!
//! ## Targets
//!
//! A [`TargetStore`] is the secondary DNS server zones are replicated into.
//! [`InMemoryTargetStore`] ships with this crate; file-backed stores live in the
//! application crate.
//!
//! ## TLS Backend
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zonesync_provider::{create_source, ProviderCredentials, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ProviderCredentials::Cloudflare {
//!         api_token: "your-token".to_string(),
//!     };
//!     let source = create_source(credentials, RetryPolicy::default())?;
//!
//!     for zone in source.list_all_zones().await? {
//!         let records = source.list_all_records(&zone.id).await?;
//!         println!("{}: {} records", zone.name, records.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Canonical Records
//!
//! [`CanonicalRecord`] is the normalized form used for comparison. Two records are
//! equal exactly when their [`IdentityKey`]s are equal: host name, type, TTL and
//! every type-specific field take part, trailing dots on names do not.
//!
//! ## Error Handling
//!
//! All adapter operations return [`Result<T, ProviderError>`](ProviderError).
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are retried with
//! exponential backoff under a [`RetryPolicy`]. See [`ProviderError`] for the full list.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::create_source;

pub use http_client::RetryPolicy;

// Re-export adapter traits (internal traits are not exported)
pub use traits::{SourceProvider, TargetStore};

// Re-export types
pub use types::{
    APEX_HOST, CanonicalRecord, IdentityKey, PaginatedResponse, PaginationParams, ProviderCredentials,
    ProviderType, RecordData, RecordType, SourceRecord, SourceZone, SrvFields, TargetRecord,
    ZoneStatus, normalize_fqdn, normalize_host_name, target_fields,
};

// Name helpers shared with the reconciliation core
pub use providers::common::{full_name_to_relative, normalize_zone_name};

// Re-export concrete adapters
#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;
pub use providers::{InMemoryTargetStore, seed_zone_records};
