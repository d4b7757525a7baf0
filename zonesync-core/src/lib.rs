//! zonesync Core Library
//!
//! Replicates DNS zones from cloud source accounts onto a secondary target store:
//! - Normalization of raw source / target records into canonical records
//! - Collision guard, multiset diff and ordered apply (removes before adds)
//! - Sync service driving whole runs with a bounded cross-zone worker pool
//!
//! The library is platform-independent: sources, the target store, snapshot storage
//! and run reporting are injected through traits.

pub mod error;
pub mod reconcile;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use reconcile::{EditSet, PartialApply};
pub use services::{RunAggregator, ServiceContext, SyncService};
pub use traits::{InMemorySourceRegistry, RunReporter, SnapshotWriter, SourceRegistry};
pub use types::{
    RecordCollection, RunFailure, RunOptions, RunSummary, ZoneReport, ZoneSnapshot,
};

// Re-export the adapter library
pub use zonesync_provider;
