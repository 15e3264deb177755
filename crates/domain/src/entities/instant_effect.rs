//! Instant effects and effect triggers.
//!
//! Instant effects are one-shot consequences of using an item (deal damage,
//! heal, apply an affliction). Triggers decide when an item's effects fire
//! relative to the roll outcome.

use serde::{Deserialize, Serialize};

use crate::effects::AfflictionId;
use crate::value_objects::Outcome;

/// When an item's effect fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectTrigger {
    /// Always on while the effect exists; never fired by a roll.
    #[default]
    Passive,
    OnUse,
    /// Success or critical.
    OnSuccess,
    OnCritical,
    OnFailure,
}

impl EffectTrigger {
    pub fn fires_on(&self, outcome: Outcome) -> bool {
        match self {
            EffectTrigger::Passive => false,
            EffectTrigger::OnUse => true,
            EffectTrigger::OnSuccess => outcome.is_success(),
            EffectTrigger::OnCritical => outcome == Outcome::Critical,
            EffectTrigger::OnFailure => outcome == Outcome::Failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "label")]
pub enum InstantKind {
    /// Roll damage with this formula (e.g. `2d6`).
    Damage { formula: String },
    /// Roll healing with this formula.
    Heal { formula: String },
    HealthLoss { amount: i32 },
    HealthRecover { amount: i32 },
    ApplyAffliction { affliction: AfflictionId },
    ClearAfflictions,
}

impl InstantKind {
    pub fn label_key(&self) -> &'static str {
        match self {
            InstantKind::Damage { .. } => "WW.InstantEffect.Damage",
            InstantKind::Heal { .. } => "WW.InstantEffect.Heal",
            InstantKind::HealthLoss { .. } => "WW.InstantEffect.HealthLoss",
            InstantKind::HealthRecover { .. } => "WW.InstantEffect.HealthRecover",
            InstantKind::ApplyAffliction { .. } => "WW.InstantEffect.ApplyAffliction",
            InstantKind::ClearAfflictions => "WW.InstantEffect.ClearAfflictions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantEffect {
    pub trigger: EffectTrigger,
    #[serde(flatten)]
    pub kind: InstantKind,
}

impl InstantEffect {
    pub fn new(trigger: EffectTrigger, kind: InstantKind) -> Self {
        Self { trigger, kind }
    }
}

/// Instant effects whose trigger matches `outcome`, in declaration order.
pub fn fired_by(effects: &[InstantEffect], outcome: Outcome) -> impl Iterator<Item = &InstantEffect> {
    effects.iter().filter(move |e| e.trigger.fires_on(outcome))
}
