//! Active effect entity - a bundle of changes attached to an actor or item

use serde::{Deserialize, Serialize};

use crate::effects::{AfflictionId, EffectChange};
use crate::EffectId;

use super::instant_effect::EffectTrigger;

/// An effect document embedded in an actor or item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub id: EffectId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub changes: Vec<EffectChange>,
    /// Duration in seconds, `None` for permanent effects.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub disabled: bool,
    /// Set on effects materialized from the affliction catalog.
    #[serde(default)]
    pub affliction: Option<AfflictionId>,
    #[serde(default)]
    pub trigger: EffectTrigger,
}

impl ActiveEffect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EffectId::new(),
            name: name.into(),
            icon: None,
            changes: Vec::new(),
            duration: None,
            disabled: false,
            affliction: None,
            trigger: EffectTrigger::Passive,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_change(mut self, change: EffectChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn with_changes(mut self, changes: impl IntoIterator<Item = EffectChange>) -> Self {
        self.changes.extend(changes);
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_trigger(mut self, trigger: EffectTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn is_affliction(&self) -> bool {
        self.affliction.is_some()
    }

    /// Enabled passive effects are the ones whose changes apply to their owner.
    pub fn applies_to_owner(&self) -> bool {
        !self.disabled && self.trigger == EffectTrigger::Passive
    }

    /// Copy of a triggered item effect, ready to be created on a target.
    pub fn materialize(&self) -> Self {
        Self {
            id: EffectId::new(),
            trigger: EffectTrigger::Passive,
            ..self.clone()
        }
    }
}
