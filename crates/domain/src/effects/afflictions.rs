//! Affliction catalog.
//!
//! Afflictions are named bundles of effect changes. The catalog is built once
//! and shared read-only; applying an affliction materializes it as an
//! [`ActiveEffect`] flagged with its [`AfflictionId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::ActiveEffect;
use crate::error::DomainError;
use crate::value_objects::{AgainstKey, Attribute};

use super::change::EffectChange;

/// Default affliction duration: one hour.
pub const AFFLICTION_DURATION: u32 = 3600;

/// Priority of the shared bane/boons-against building blocks.
pub const AFFLICTION_PRIORITY: i32 = 120;

/// Priority of speed overrides, applied after additive speed changes.
pub const SPEED_OVERRIDE_PRIORITY: i32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AfflictionId {
    Blinded,
    Confused,
    Controlled,
    Cursed,
    Deafened,
    Frightened,
    Held,
    ImpairedStr,
    ImpairedAgi,
    ImpairedInt,
    ImpairedWil,
    Asleep,
    Poisoned,
    Prone,
    Slowed,
    Stunned,
    Unconscious,
    Vulnerable,
    Weakened,
    Dazed,
}

impl AfflictionId {
    /// Catalog order.
    pub const ALL: [AfflictionId; 20] = [
        AfflictionId::Blinded,
        AfflictionId::Confused,
        AfflictionId::Controlled,
        AfflictionId::Cursed,
        AfflictionId::Deafened,
        AfflictionId::Frightened,
        AfflictionId::Held,
        AfflictionId::ImpairedStr,
        AfflictionId::ImpairedAgi,
        AfflictionId::ImpairedInt,
        AfflictionId::ImpairedWil,
        AfflictionId::Asleep,
        AfflictionId::Poisoned,
        AfflictionId::Prone,
        AfflictionId::Slowed,
        AfflictionId::Stunned,
        AfflictionId::Unconscious,
        AfflictionId::Vulnerable,
        AfflictionId::Weakened,
        AfflictionId::Dazed,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AfflictionId::Blinded => "blinded",
            AfflictionId::Confused => "confused",
            AfflictionId::Controlled => "controlled",
            AfflictionId::Cursed => "cursed",
            AfflictionId::Deafened => "deafened",
            AfflictionId::Frightened => "frightened",
            AfflictionId::Held => "held",
            AfflictionId::ImpairedStr => "impairedStr",
            AfflictionId::ImpairedAgi => "impairedAgi",
            AfflictionId::ImpairedInt => "impairedInt",
            AfflictionId::ImpairedWil => "impairedWil",
            AfflictionId::Asleep => "asleep",
            AfflictionId::Poisoned => "poisoned",
            AfflictionId::Prone => "prone",
            AfflictionId::Slowed => "slowed",
            AfflictionId::Stunned => "stunned",
            AfflictionId::Unconscious => "unconscious",
            AfflictionId::Vulnerable => "vulnerable",
            AfflictionId::Weakened => "weakened",
            AfflictionId::Dazed => "dazed",
        }
    }

    /// Localization suffix, e.g. `Stunned` or `ImpairedStr`.
    fn label(&self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for AfflictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AfflictionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AfflictionId::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::parse(format!("Unknown affliction: {}", s)))
    }
}

/// A named condition bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affliction {
    pub id: AfflictionId,
    pub name_key: String,
    pub description_key: String,
    pub icon: String,
    pub changes: Vec<EffectChange>,
    pub duration: u32,
}

impl Affliction {
    fn new(id: AfflictionId, changes: Vec<EffectChange>) -> Self {
        let label = id.label();
        Self {
            id,
            name_key: format!("WW.Affliction.{}", label),
            description_key: format!("WW.Affliction.{}Desc", label),
            icon: format!("systems/weirdwizard/assets/icons/afflictions/{}.svg", id.key()),
            changes,
            duration: AFFLICTION_DURATION,
        }
    }

    /// Effect document for this affliction.
    pub fn to_effect(&self) -> ActiveEffect {
        let mut effect = ActiveEffect::new(&self.name_key)
            .with_icon(&self.icon)
            .with_changes(self.changes.iter().cloned())
            .with_duration(self.duration);
        effect.affliction = Some(self.id);
        effect
    }
}

/// One bane on each physical and mental attribute.
pub fn bane_all_attributes(value: i32) -> Vec<EffectChange> {
    Attribute::PHYSICAL_MENTAL
        .into_iter()
        .map(|attribute| {
            EffectChange::new(format!("banes.{}", attribute.key()), value)
                .with_priority(AFFLICTION_PRIORITY)
        })
        .collect()
}

/// Boons to every roll made against the afflicted creature.
pub fn against_all(value: i32) -> Vec<EffectChange> {
    AgainstKey::ALL
        .into_iter()
        .map(|key| {
            EffectChange::new(format!("boonsAgainst.{}", key.key()), value)
                .with_priority(AFFLICTION_PRIORITY)
        })
        .collect()
}

fn speed_override(value: i32) -> EffectChange {
    EffectChange::new("speed.override", value).with_priority(SPEED_OVERRIDE_PRIORITY)
}

fn banes(attributes: &[Attribute], value: i32) -> Vec<EffectChange> {
    attributes
        .iter()
        .map(|attribute| EffectChange::new(format!("banes.{}", attribute.key()), value))
        .collect()
}

fn auto_fail(attributes: &[Attribute]) -> Vec<EffectChange> {
    attributes
        .iter()
        .map(|attribute| EffectChange::new(format!("autoFail.{}", attribute.key()), true))
        .collect()
}

fn changes_for(id: AfflictionId) -> Vec<EffectChange> {
    use Attribute::{Agi, Int, Str, Wil};

    match id {
        AfflictionId::Blinded => {
            let mut changes = vec![speed_override(2)];
            changes.extend(against_all(1));
            changes
        }
        AfflictionId::Confused => banes(&[Int, Wil], 1),
        AfflictionId::Controlled | AfflictionId::Deafened | AfflictionId::Dazed => Vec::new(),
        AfflictionId::Cursed => banes(&[Attribute::Luck], 1),
        AfflictionId::Frightened | AfflictionId::Poisoned => bane_all_attributes(1),
        AfflictionId::Held => vec![speed_override(0)],
        AfflictionId::ImpairedStr => banes(&[Str], 1),
        AfflictionId::ImpairedAgi => banes(&[Agi], 1),
        AfflictionId::ImpairedInt => banes(&[Int], 1),
        AfflictionId::ImpairedWil => banes(&[Wil], 1),
        AfflictionId::Asleep | AfflictionId::Unconscious => {
            let mut changes = vec![speed_override(0)];
            changes.extend(auto_fail(&[Str, Agi]));
            changes.extend(against_all(2));
            changes
        }
        AfflictionId::Prone => vec![
            EffectChange::new("banes.attacks", 1),
            EffectChange::new("boonsAgainst.def", 1),
        ],
        AfflictionId::Slowed => vec![EffectChange::new("speed.halved", true)],
        AfflictionId::Stunned => {
            let mut changes = vec![speed_override(0)];
            changes.extend(bane_all_attributes(2));
            changes.extend(against_all(2));
            changes
        }
        AfflictionId::Vulnerable => against_all(1),
        AfflictionId::Weakened => banes(&[Str, Agi], 1),
    }
}

/// Immutable, ordered set of every affliction.
#[derive(Debug, Clone)]
pub struct AfflictionCatalog {
    afflictions: Vec<Affliction>,
}

impl AfflictionCatalog {
    pub fn build_all() -> Self {
        let afflictions = AfflictionId::ALL
            .into_iter()
            .map(|id| Affliction::new(id, changes_for(id)))
            .collect();
        Self { afflictions }
    }

    pub fn get(&self, id: AfflictionId) -> Option<&Affliction> {
        self.afflictions.iter().find(|affliction| affliction.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Affliction> {
        self.afflictions.iter()
    }

    pub fn len(&self) -> usize {
        self.afflictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.afflictions.is_empty()
    }
}
