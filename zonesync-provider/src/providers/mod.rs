//! Source and target adapter implementations

/// Shared utilities used by adapter implementations.
pub mod common;

#[cfg(feature = "cloudflare")]
mod cloudflare;
mod memory;

#[cfg(feature = "cloudflare")]
pub use cloudflare::CloudflareProvider;
pub use memory::{InMemoryTargetStore, seed_zone_records};
