//! Record reconciliation: normalize → guard → diff → apply
//!
//! Everything here works on a single zone. Normalization, the guard and the diff are
//! pure; only the apply step talks to the target store.

pub mod apply;
pub mod diff;
pub mod guard;
pub mod normalize;

pub use apply::{PartialApply, apply_adds, apply_removes, select_removal_target};
pub use diff::{EditSet, diff};
pub use guard::{check_safe, repeats_zone_name};
pub use normalize::{
    normalize_source, normalize_source_record, normalize_target, normalize_target_record,
};
