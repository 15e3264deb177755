//! Active-effect change model: key registry, resolution and afflictions.

mod afflictions;
mod change;
mod derived;
mod registry;
mod resolution;

pub use afflictions::{
    against_all, bane_all_attributes, Affliction, AfflictionCatalog, AfflictionId,
    AFFLICTION_DURATION, AFFLICTION_PRIORITY, SPEED_OVERRIDE_PRIORITY,
};
pub use change::{
    add_int, down_int, over_int, set_boo, up_int, ChangeMeta, ChangeMode, EffectChange,
    ResolvedChange, ValueType,
};
pub use derived::{BrokenChange, DerivedStats};
pub use registry::{paths, EffectChangeRegistry, BROKEN_CHANGE_MARKER};
pub use resolution::{apply_change, apply_changes, resolve_changes, sort_by_priority};

/// Tooltip line for a change, see [`EffectChangeRegistry::describe`].
pub fn describe_change(registry: &EffectChangeRegistry, change: &EffectChange) -> String {
    registry.describe(change)
}
