//! Actor entity - characters and NPCs
//!
//! Base stats live in a [`PropertyBag`] keyed by the same dotted paths that
//! effect changes write to, so derived values are the base bag with every
//! applicable change folded in (see [`crate::effects::DerivedStats`]).

use serde::{Deserialize, Serialize};

use crate::effects::{paths, AfflictionId};
use crate::value_objects::{Attribute, ChangeValue, PropertyBag};
use crate::{ActorId, EffectId, ItemId};

use super::active_effect::ActiveEffect;
use super::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
    /// Player character
    Character,
    Npc,
}

/// Token disposition. Host codes: friendly 1, neutral 0, hostile -1, secret -2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    Friendly,
    #[default]
    Neutral,
    Hostile,
    Secret,
}

impl Disposition {
    pub fn code(&self) -> i8 {
        match self {
            Disposition::Friendly => 1,
            Disposition::Neutral => 0,
            Disposition::Hostile => -1,
            Disposition::Secret => -2,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1 => Some(Disposition::Friendly),
            0 => Some(Disposition::Neutral),
            -1 => Some(Disposition::Hostile),
            -2 => Some(Disposition::Secret),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    #[serde(default)]
    pub disposition: Disposition,
    /// Base values by document path, before effects.
    #[serde(default)]
    pub base: PropertyBag,
    /// Damage taken; the actor is incapacitated when it reaches health.
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Actor {
    /// New actor with every attribute at 10 and luck at 0.
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        let mut base = PropertyBag::new()
            .with_int(paths::DEFENSE_NATURAL, 10)
            .with_int(paths::HEALTH_NORMAL, 10)
            .with_int(paths::HEALTH_CURRENT, 10)
            .with_int(paths::SPEED, 5)
            .with_int(paths::SIZE, 1);
        for attribute in Attribute::PHYSICAL_MENTAL {
            base.set(paths::attribute_score(attribute), ChangeValue::Int(10));
        }
        base.set(paths::attribute_score(Attribute::Luck), ChangeValue::Int(0));

        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            disposition: match kind {
                ActorKind::Character => Disposition::Friendly,
                ActorKind::Npc => Disposition::Hostile,
            },
            base,
            damage: 0,
            effects: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute, score: i32) -> Self {
        self.base
            .set(paths::attribute_score(attribute), ChangeValue::Int(score));
        self
    }

    pub fn with_stat(mut self, path: &str, value: i32) -> Self {
        self.base.set(path, ChangeValue::Int(value));
        self
    }

    pub fn with_effect(mut self, effect: ActiveEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Character
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn has_affliction(&self, affliction: AfflictionId) -> bool {
        self.effects
            .iter()
            .any(|effect| effect.affliction == Some(affliction))
    }

    /// Ids of every effect flagged as an affliction.
    pub fn affliction_effect_ids(&self) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|effect| effect.is_affliction())
            .map(|effect| effect.id)
            .collect()
    }

    /// Damage after taking `amount`, kept within `0..=health`.
    pub fn damage_after(&self, amount: i32, health: i32) -> i32 {
        self.damage.saturating_add(amount).clamp(0, health.max(0))
    }

    /// Damage after healing `amount`.
    pub fn damage_after_healing(&self, amount: i32, health: i32) -> i32 {
        self.damage_after(-amount, health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectChange;

    #[test]
    fn new_actor_has_average_attributes() {
        let actor = Actor::new("Ada", ActorKind::Character);
        assert_eq!(actor.base.int("attributes.str.value"), 10);
        assert_eq!(actor.base.int("attributes.luck.value"), 0);
        assert_eq!(actor.disposition, Disposition::Friendly);
        assert_eq!(Actor::new("Orc", ActorKind::Npc).disposition, Disposition::Hostile);
    }

    #[test]
    fn damage_is_clamped_to_health() {
        let mut actor = Actor::new("Ada", ActorKind::Character);
        assert_eq!(actor.damage_after(4, 10), 4);
        assert_eq!(actor.damage_after(40, 10), 10);
        actor.damage = 3;
        assert_eq!(actor.damage_after_healing(5, 10), 0);
        assert_eq!(actor.damage_after_healing(2, 10), 1);
    }

    #[test]
    fn affliction_lookup() {
        let mut stunned = ActiveEffect::new("WW.Affliction.Stunned")
            .with_change(EffectChange::new("speed.override", 0));
        stunned.affliction = Some(AfflictionId::Stunned);
        let stunned_id = stunned.id;
        let actor = Actor::new("Ada", ActorKind::Character)
            .with_effect(stunned)
            .with_effect(ActiveEffect::new("Blessed"));

        assert!(actor.has_affliction(AfflictionId::Stunned));
        assert!(!actor.has_affliction(AfflictionId::Prone));
        assert_eq!(actor.affliction_effect_ids(), vec![stunned_id]);
    }

    #[test]
    fn disposition_codes_round_trip() {
        for disposition in [
            Disposition::Friendly,
            Disposition::Neutral,
            Disposition::Hostile,
            Disposition::Secret,
        ] {
            assert_eq!(Disposition::from_code(disposition.code()), Some(disposition));
        }
    }
}
