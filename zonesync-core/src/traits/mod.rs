//! Collaborator abstraction trait definitions

mod run_reporter;
mod snapshot_writer;
mod source_registry;

pub use run_reporter::RunReporter;
pub use snapshot_writer::SnapshotWriter;
pub use source_registry::{InMemorySourceRegistry, SourceRegistry};

// Adapter traits live in the provider crate
pub use zonesync_provider::{SourceProvider, TargetStore};
