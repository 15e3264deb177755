//! Derived actor stats: the base property bag with every applicable effect
//! change folded in.

use crate::entities::Actor;
use crate::value_objects::{AgainstKey, Attribute, BoonsAgainst, ChangeValue, PropertyBag};

use super::change::EffectChange;
use super::registry::{paths, EffectChangeRegistry};
use super::resolution::apply_changes;

/// A change that could not be resolved against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenChange {
    pub effect: String,
    pub change: EffectChange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedStats {
    values: PropertyBag,
    broken: Vec<BrokenChange>,
}

impl DerivedStats {
    /// Fold the changes of every enabled passive effect into the actor's base
    /// values. Broken changes are skipped and kept for reporting.
    pub fn prepare(actor: &Actor, registry: &EffectChangeRegistry) -> Self {
        let mut resolved = Vec::new();
        let mut broken = Vec::new();
        for effect in actor.effects.iter().filter(|e| e.applies_to_owner()) {
            for change in &effect.changes {
                match registry.resolve(change) {
                    Ok(change) => resolved.push(change),
                    Err(_) => broken.push(BrokenChange {
                        effect: effect.name.clone(),
                        change: change.clone(),
                    }),
                }
            }
        }

        let mut values = actor.base.clone();
        apply_changes(&mut values, resolved);
        Self { values, broken }
    }

    pub fn values(&self) -> &PropertyBag {
        &self.values
    }

    pub fn broken_changes(&self) -> &[BrokenChange] {
        &self.broken
    }

    pub fn attribute_score(&self, attribute: Attribute) -> i32 {
        self.values.int(&paths::attribute_score(attribute))
    }

    /// Roll modifier of an attribute: score - 10, luck adds nothing.
    pub fn attribute_modifier(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Luck => 0,
            _ => self.attribute_score(attribute) - 10,
        }
    }

    /// Net boons on the actor's own rolls with `attribute`.
    pub fn self_boons(&self, attribute: Attribute) -> i32 {
        self.values.int(&paths::self_boons(attribute))
    }

    pub fn attack_boons(&self) -> i32 {
        self.values.int(paths::ATTACK_BOONS)
    }

    pub fn spell_boons(&self) -> i32 {
        self.values.int(paths::SPELL_BOONS)
    }

    pub fn auto_fail(&self, attribute: Attribute) -> bool {
        self.values.flag(&paths::auto_fail(attribute))
    }

    pub fn auto_success_against(&self, key: AgainstKey) -> bool {
        self.values.flag(&paths::auto_success_against(key))
    }

    /// Boons granted to rolls made against this actor.
    pub fn boons_against(&self) -> BoonsAgainst {
        let mut against = BoonsAgainst {
            from_attacks: self.values.int(paths::AGAINST_FROM_ATTACKS),
            from_spells: self.values.int(paths::AGAINST_FROM_SPELLS),
            from_magical: self.values.int(paths::AGAINST_FROM_MAGICAL),
            ..BoonsAgainst::default()
        };
        for key in AgainstKey::ALL {
            let boons = self.values.int(&paths::boons_against(key));
            if boons != 0 {
                against.by_key.insert(key, boons);
            }
            if self.auto_success_against(key) {
                against.auto_success.insert(key);
            }
        }
        against
    }

    pub fn extra_damage_dice(&self) -> i32 {
        self.values.int(paths::EXTRA_DAMAGE_DICE)
    }

    pub fn extra_damage_mod(&self) -> i32 {
        self.values.int(paths::EXTRA_DAMAGE_MOD)
    }

    /// Bonus damage dice.
    pub fn bonus_damage(&self) -> i32 {
        self.values.int(paths::BONUS_DAMAGE)
    }

    /// The better of natural and armored defense plus bonuses, unless
    /// overridden.
    pub fn defense(&self) -> i32 {
        if let Some(value) = self
            .values
            .get(paths::DEFENSE_OVERRIDE)
            .and_then(ChangeValue::as_int)
        {
            return value;
        }
        let natural = self.values.int(paths::DEFENSE_NATURAL);
        let armored = self.values.int(paths::DEFENSE_ARMORED);
        natural.max(armored) + self.values.int(paths::DEFENSE_BONUS)
    }

    pub fn speed(&self) -> i32 {
        let speed = self.values.int(paths::SPEED).max(0);
        if self.values.flag(paths::SPEED_HALVED) {
            speed / 2
        } else {
            speed
        }
    }

    pub fn size(&self) -> i32 {
        self.values.int(paths::SIZE)
    }

    /// Normal health after effects.
    pub fn health(&self) -> i32 {
        self.values.int(paths::HEALTH_NORMAL)
    }

    /// Current health, never above normal health.
    pub fn current_health(&self) -> i32 {
        self.values.int(paths::HEALTH_CURRENT).min(self.health())
    }
}
