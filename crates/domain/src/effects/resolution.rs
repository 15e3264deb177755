//! Folding resolved changes into document values.

use crate::value_objects::{ChangeValue, PropertyBag};

use super::change::{ChangeMode, ResolvedChange};

/// Sort changes into application order.
///
/// Ascending priority. Changes without a priority come first and, like equal
/// priorities, keep their insertion order (the sort is stable).
pub fn sort_by_priority(changes: &mut [ResolvedChange]) {
    changes.sort_by_key(|change| match change.priority {
        None => (0, 0),
        Some(priority) => (1, priority),
    });
}

/// Merge one change into the current value of its path.
pub fn apply_change(current: Option<&ChangeValue>, change: &ResolvedChange) -> Option<ChangeValue> {
    match &change.value {
        ChangeValue::Int(value) => {
            let base = current.and_then(ChangeValue::as_int);
            let merged = match change.mode {
                ChangeMode::Custom => return current.cloned(),
                ChangeMode::Add => base.unwrap_or(0).saturating_add(*value),
                ChangeMode::Multiply => base.unwrap_or(0).saturating_mul(*value),
                ChangeMode::Override => *value,
                // Against an unset base the change itself is the only candidate.
                ChangeMode::Upgrade => base.map_or(*value, |b| b.max(*value)),
                ChangeMode::Downgrade => base.map_or(*value, |b| b.min(*value)),
            };
            Some(ChangeValue::Int(merged))
        }
        ChangeValue::Bool(value) => match change.mode {
            ChangeMode::Override => Some(ChangeValue::Bool(*value)),
            _ => current.cloned(),
        },
        ChangeValue::Str(value) => match change.mode {
            ChangeMode::Override => Some(ChangeValue::Str(value.clone())),
            ChangeMode::Add => {
                let mut merged = current
                    .and_then(ChangeValue::as_str)
                    .unwrap_or_default()
                    .to_string();
                merged.push_str(value);
                Some(ChangeValue::Str(merged))
            }
            _ => current.cloned(),
        },
    }
}

/// Apply every change to `bag` in priority order.
pub fn apply_changes(bag: &mut PropertyBag, mut changes: Vec<ResolvedChange>) {
    sort_by_priority(&mut changes);
    for change in &changes {
        if let Some(value) = apply_change(bag.get(&change.path), change) {
            bag.set(change.path.clone(), value);
        }
    }
}

/// Resolve a single integer stat from its base value and a set of changes.
pub fn resolve_changes(base: i32, changes: Vec<ResolvedChange>) -> i32 {
    let mut bag = PropertyBag::new().with_int("value", base);
    let changes = changes
        .into_iter()
        .map(|change| ResolvedChange {
            path: "value".to_string(),
            ..change
        })
        .collect();
    apply_changes(&mut bag, changes);
    bag.int("value")
}
