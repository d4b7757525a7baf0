//! 类型定义模块

mod collection;
mod report;

pub use collection::RecordCollection;
pub use report::{
    DEFAULT_MAX_CONCURRENT_ZONES, RunFailure, RunOptions, RunSummary, ZoneReport, ZoneSnapshot,
};

// Re-export provider 库的公共类型
pub use zonesync_provider::{
    CanonicalRecord, IdentityKey, RecordData, RecordType, SourceRecord, SourceZone, TargetRecord,
};
